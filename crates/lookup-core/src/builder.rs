//! Construction of a fetch session from configuration.

use crate::session::OrderFetchSession;
use crate::view::ViewOptions;
use lookup_config::Config;
use lookup_transport::{create_transport, TransportError};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a session.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Transport error: {0}")]
	Transport(#[from] TransportError),
}

/// Builds an [`OrderFetchSession`] and its view options from configuration.
pub struct SessionBuilder {
	config: Config,
}

impl SessionBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Validates the configuration and creates the primary transport.
	pub fn build(self) -> Result<(OrderFetchSession, ViewOptions), SessionError> {
		self.config
			.validate()
			.map_err(|e| SessionError::Config(e.to_string()))?;

		let primary = &self.config.transport.primary;
		let transport_config = self.config.transport.primary_config().ok_or_else(|| {
			SessionError::Config(format!("Primary transport '{}' is not configured", primary))
		})?;

		let transport = create_transport(primary, transport_config)?;
		let session = OrderFetchSession::new(Arc::from(transport));

		Ok((session, ViewOptions::from(&self.config.lookup)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use lookup_types::SessionState;

	#[test]
	fn test_build_default() {
		let (session, options) = SessionBuilder::new(Config::default()).build().unwrap();
		assert_eq!(session.state(), SessionState::Idle);
		assert_eq!(options, ViewOptions::default());
	}

	#[test]
	fn test_build_rejects_unknown_primary() {
		let config: Config = r#"
[transport]
primary = "carrier-pigeon"

[transport.implementations.carrier-pigeon]
"#
		.parse()
		.unwrap();

		let result = SessionBuilder::new(config).build();
		assert!(matches!(result, Err(SessionError::Transport(_))));
	}

	#[test]
	fn test_build_rejects_bad_base_url() {
		let mut config = Config::default();
		config.override_base_url("localhost:8081");

		let result = SessionBuilder::new(config).build();
		assert!(matches!(
			result,
			Err(SessionError::Transport(TransportError::Configuration(_)))
		));
	}

	#[tokio::test]
	async fn test_build_fixture() {
		let config: Config = r#"
[lookup]
datetime_format = "%d.%m.%Y"

[transport]
primary = "fixture"

[transport.implementations.fixture.orders.abc]
status = 200
body = '{"orderUID":"abc"}'
"#
		.parse()
		.unwrap();

		let (session, options) = SessionBuilder::new(config).build().unwrap();
		assert_eq!(options.datetime_format, "%d.%m.%Y");

		assert!(session.fetch("abc").await.is_success());
		assert_eq!(
			session.fetch("other").await.error_message(),
			Some("order not found")
		);
	}

	#[tokio::test]
	async fn test_demo_config() {
		let mut config: Config = include_str!("../../../config/demo.toml").parse().unwrap();
		config.transport.primary = "fixture".to_string();

		let (session, _) = SessionBuilder::new(config).build().unwrap();
		match session.fetch("b563feb7b2b84b6test").await {
			lookup_types::FetchOutcome::Success(record) => {
				assert_eq!(record.delivery.city, "Kiryat Mozkin");
				assert_eq!(record.items.len(), 1);
			},
			other => panic!("expected success, got {:?}", other),
		}
		assert_eq!(
			session.fetch("broken").await.error_message(),
			Some("internal error")
		);
	}
}
