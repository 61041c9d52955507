//! In-memory fixture transport.
//!
//! Serves canned responses keyed by order UID, useful for demos without a
//! running backend and for exercising the fetch session in tests. Orders that
//! have no fixture answer like the backend does for an unknown UID.

use crate::{
	TransportError, TransportFactory, TransportInterface, TransportRegistry, TransportResponse,
};
use async_trait::async_trait;
use lookup_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Status returned for orders without a fixture.
pub const NOT_FOUND_STATUS: u16 = 404;

/// Body returned for orders without a fixture.
pub const NOT_FOUND_BODY: &str = r#"{"error":"order not found"}"#;

/// A canned response, optionally delayed.
#[derive(Debug, Clone)]
pub struct FixtureResponse {
	pub response: TransportResponse,
	pub delay: Duration,
}

/// Fixture transport implementation.
#[derive(Debug, Default)]
pub struct FixtureTransport {
	responses: HashMap<String, FixtureResponse>,
	requests: AtomicUsize,
}

impl FixtureTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answers `order_uid` with `status` and `body`.
	pub fn with_response(self, order_uid: &str, status: u16, body: impl Into<String>) -> Self {
		self.with_delayed_response(order_uid, status, body, Duration::ZERO)
	}

	/// Answers `order_uid` with `status` and `body` after `delay`.
	pub fn with_delayed_response(
		mut self,
		order_uid: &str,
		status: u16,
		body: impl Into<String>,
		delay: Duration,
	) -> Self {
		self.responses.insert(
			order_uid.to_string(),
			FixtureResponse {
				response: TransportResponse::new(status, body),
				delay,
			},
		);
		self
	}

	/// Number of requests served so far.
	pub fn request_count(&self) -> usize {
		self.requests.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl TransportInterface for FixtureTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FixtureTransportSchema)
	}

	async fn get_order(&self, order_uid: &str) -> Result<TransportResponse, TransportError> {
		self.requests.fetch_add(1, Ordering::SeqCst);

		let Some(fixture) = self.responses.get(order_uid) else {
			tracing::debug!(order_uid, "No fixture for order");
			return Ok(TransportResponse::new(NOT_FOUND_STATUS, NOT_FOUND_BODY));
		};

		if !fixture.delay.is_zero() {
			tokio::time::sleep(fixture.delay).await;
		}

		Ok(fixture.response.clone())
	}
}

/// Configuration schema for FixtureTransport.
pub struct FixtureTransportSchema;

impl FixtureTransportSchema {
	fn order_schema() -> Schema {
		Schema::new(
			vec![Field::new(
				"status",
				FieldType::Integer {
					min: Some(100),
					max: Some(599),
				},
			)],
			vec![
				Field::new("body", FieldType::String),
				Field::new(
					"delay_ms",
					FieldType::Integer {
						min: Some(0),
						max: None,
					},
				),
			],
		)
	}
}

impl ConfigSchema for FixtureTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![Field::new("orders", FieldType::Table)]).validate(config)?;

		let Some(orders) = config.get("orders").and_then(|v| v.as_table()) else {
			return Ok(());
		};

		let order_schema = Self::order_schema();
		for (order_uid, entry) in orders {
			order_schema.validate(entry).map_err(|e| ValidationError::InvalidValue {
				field: format!("orders.{}", order_uid),
				message: e.to_string(),
			})?;
		}

		Ok(())
	}
}

/// Factory function to create a fixture transport from configuration.
///
/// Configuration parameters:
/// - `orders.<order_uid>.status`: HTTP status to answer with (required per order)
/// - `orders.<order_uid>.body`: response body text (optional, empty by default)
/// - `orders.<order_uid>.delay_ms`: delay before answering (optional)
pub fn create_transport(
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	let mut transport = FixtureTransport::new();
	if let Some(orders) = config.get("orders").and_then(|v| v.as_table()) {
		for (order_uid, entry) in orders {
			let status = entry
				.get("status")
				.and_then(|v| v.as_integer())
				.and_then(|v| u16::try_from(v).ok())
				.ok_or_else(|| {
					TransportError::Configuration(format!("orders.{}.status is required", order_uid))
				})?;
			let body = entry.get("body").and_then(|v| v.as_str()).unwrap_or_default();
			let delay = entry
				.get("delay_ms")
				.and_then(|v| v.as_integer())
				.map(|ms| Duration::from_millis(ms as u64))
				.unwrap_or_default();

			transport = transport.with_delayed_response(order_uid, status, body, delay);
		}
	}

	Ok(Box::new(transport))
}

/// Registry for the fixture transport implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "fixture";
	type Factory = TransportFactory;

	fn factory() -> Self::Factory {
		create_transport
	}
}

impl TransportRegistry for Registry {}
