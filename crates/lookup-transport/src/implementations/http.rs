//! HTTP transport implementation backed by reqwest.
//!
//! Requests `GET <base_url>/order/<order_uid>` and returns the status and body
//! text untouched. The identifier becomes a single path segment; only the
//! characters a path segment cannot hold are percent-encoded.

use crate::{
	TransportError, TransportFactory, TransportInterface, TransportRegistry, TransportResponse,
};
use async_trait::async_trait;
use lookup_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use reqwest::{Client, Url};
use std::error::Error as _;
use std::time::Duration;

/// HTTP transport talking to the order backend.
pub struct HttpTransport {
	client: Client,
	base_url: Url,
	timeout: Option<Duration>,
}

impl HttpTransport {
	/// Creates a transport for `base_url` with an optional request timeout.
	pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
		let base_url = parse_base_url(base_url).map_err(TransportError::Configuration)?;

		let mut builder = Client::builder().pool_idle_timeout(Duration::from_secs(90));
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|e| TransportError::Configuration(format!("Failed to build client: {}", e)))?;

		Ok(Self {
			client,
			base_url,
			timeout,
		})
	}

	/// URL of the order endpoint for `order_uid`.
	pub fn order_url(&self, order_uid: &str) -> Result<Url, TransportError> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| {
				TransportError::Configuration(format!(
					"Base URL '{}' cannot carry a path",
					self.base_url
				))
			})?
			.pop_if_empty()
			.push("order")
			.push(order_uid);
		Ok(url)
	}
}

fn parse_base_url(raw: &str) -> Result<Url, String> {
	let url = Url::parse(raw).map_err(|e| format!("Invalid base URL '{}': {}", raw, e))?;
	match url.scheme() {
		"http" | "https" => Ok(url),
		other => Err(format!("Unsupported scheme '{}' in base URL '{}'", other, raw)),
	}
}

#[async_trait]
impl TransportInterface for HttpTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpTransportSchema)
	}

	async fn get_order(&self, order_uid: &str) -> Result<TransportResponse, TransportError> {
		let url = self.order_url(order_uid)?;
		tracing::debug!(url = %url, "Requesting order");

		let response = self.client.get(url).send().await.map_err(|e| {
			if e.is_timeout() {
				TransportError::Timeout(format!(
					"no response within {:?}",
					self.timeout.unwrap_or_default()
				))
			} else {
				TransportError::Network(describe(&e))
			}
		})?;

		let status = response.status().as_u16();
		let body = response.text().await.map_err(|e| {
			if e.is_timeout() {
				TransportError::Timeout("response body not received in time".to_string())
			} else {
				TransportError::Network(describe(&e))
			}
		})?;

		tracing::debug!(status, bytes = body.len(), "Received response");
		Ok(TransportResponse { status, body })
	}
}

/// Flattens a reqwest error and its sources into one line.
fn describe(error: &reqwest::Error) -> String {
	let mut message = error.to_string();
	let mut source = error.source();
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}

/// Configuration schema for HttpTransport.
pub struct HttpTransportSchema;

impl ConfigSchema for HttpTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("base_url", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(raw) => parse_base_url(raw).map(|_| ()),
						None => Err("Expected string value".to_string()),
					}
				}),
			],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);

		schema.validate(config)
	}
}

/// Factory function to create an HTTP transport from configuration.
///
/// Configuration parameters:
/// - `base_url`: backend address, e.g. "http://localhost:8081" (required)
/// - `timeout_seconds`: request timeout, 1 to 300 (optional, no timeout by default)
pub fn create_transport(
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| TransportError::Configuration("base_url is required".to_string()))?;

	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.and_then(|secs| u64::try_from(secs).ok())
		.map(Duration::from_secs);

	Ok(Box::new(HttpTransport::new(base_url, timeout)?))
}

/// Registry for the HTTP transport implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = TransportFactory;

	fn factory() -> Self::Factory {
		create_transport
	}
}

impl TransportRegistry for Registry {}
