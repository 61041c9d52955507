//! Transport module for the order lookup tool.
//!
//! This module provides the abstraction the fetch session uses to reach the
//! order backend, and its implementations: a reqwest-based HTTP client and an
//! in-memory fixture transport for offline use and tests.
//!
//! A transport performs exactly one request per call and hands back the status
//! and the raw body text; interpreting the body is left to the caller.

use async_trait::async_trait;
use lookup_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod fixture;
	pub mod http;
}

/// Errors that can occur while talking to the order backend.
#[derive(Debug, Error)]
pub enum TransportError {
	/// Connection, DNS or protocol failure, or the body could not be read.
	#[error("Network error: {0}")]
	Network(String),
	/// The request did not complete within the configured timeout.
	#[error("Request timed out: {0}")]
	Timeout(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Status and raw body of a backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
	pub status: u16,
	pub body: String,
}

impl TransportResponse {
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Trait defining the interface for transport implementations.
///
/// Any backend client that wants to serve the fetch session implements this
/// trait. One call to [`TransportInterface::get_order`] issues exactly one
/// request for `GET <base-url>/order/<order_uid>`.
#[async_trait]
pub trait TransportInterface: Send + Sync {
	/// Returns the configuration schema for this transport implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Requests the order identified by `order_uid`.
	///
	/// Any response the backend produced, including non-2xx ones, is `Ok`.
	/// Only failures to obtain a response at all are errors.
	async fn get_order(&self, order_uid: &str) -> Result<TransportResponse, TransportError>;
}

/// Type alias for transport factory functions.
pub type TransportFactory =
	fn(&toml::Value) -> Result<Box<dyn TransportInterface>, TransportError>;

/// Registry trait for transport implementations.
pub trait TransportRegistry: ImplementationRegistry<Factory = TransportFactory> {}

/// Get all registered transport implementations.
///
/// Returns a vector of (name, factory) tuples used to build the configured
/// primary transport.
pub fn get_all_implementations() -> Vec<(&'static str, TransportFactory)> {
	use implementations::{fixture, http};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(fixture::Registry::NAME, fixture::Registry::factory()),
	]
}

/// Builds the implementation registered under `name` from its configuration.
pub fn create_transport(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(registered, _)| *registered == name)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			TransportError::Configuration(format!("Unknown transport implementation '{}'", name))
		})?;

	let transport = factory(config)?;
	transport.config_schema().validate(config).map_err(|e| {
		tracing::error!(component = "transport", implementation = %name, error = %e, "Invalid configuration");
		TransportError::Configuration(format!("Invalid configuration for '{}': {}", name, e))
	})?;

	tracing::info!(component = "transport", implementation = %name, "Loaded");
	Ok(transport)
}
