//! Configuration module for the order lookup tool.
//!
//! This module provides structures and utilities for managing lookup
//! configuration. It supports loading configuration from TOML files, resolves
//! `${VAR}` and `${VAR:-default}` environment references, and validates that the
//! selected transport is configured.
//!
//! A configuration file is optional: [`Config::default`] talks to the backend
//! at `http://localhost:8081`.

use lookup_types::{is_valid_datetime_format, DEFAULT_DATETIME_FORMAT};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Base URL of the order backend when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Name of the transport implementation used by default.
pub const DEFAULT_TRANSPORT: &str = "http";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the lookup tool.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Display settings.
	#[serde(default)]
	pub lookup: LookupConfig,
	/// Transport used to reach the order backend.
	#[serde(default)]
	pub transport: TransportConfig,
}

/// Display settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
	/// `strftime` pattern for payment timestamps, rendered in the local zone.
	#[serde(default = "default_datetime_format")]
	pub datetime_format: String,
}

impl Default for LookupConfig {
	fn default() -> Self {
		Self {
			datetime_format: default_datetime_format(),
		}
	}
}

fn default_datetime_format() -> String {
	DEFAULT_DATETIME_FORMAT.to_string()
}

/// Configuration for the transport layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
	/// Which implementation to use as primary.
	#[serde(default = "default_primary_transport")]
	pub primary: String,
	/// Map of transport implementation names to their configurations.
	/// Each implementation has its own configuration format stored as raw TOML values.
	#[serde(default = "default_transport_implementations")]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			primary: default_primary_transport(),
			implementations: default_transport_implementations(),
		}
	}
}

impl TransportConfig {
	/// Configuration table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

fn default_primary_transport() -> String {
	DEFAULT_TRANSPORT.to_string()
}

fn default_transport_implementations() -> HashMap<String, toml::Value> {
	let mut table = toml::map::Map::new();
	table.insert(
		"base_url".to_string(),
		toml::Value::String(DEFAULT_BASE_URL.to_string()),
	);

	let mut implementations = HashMap::new();
	implementations.insert(DEFAULT_TRANSPORT.to_string(), toml::Value::Table(table));
	implementations
}

/// Longest configuration text accepted, in bytes.
const MAX_CONFIG_SIZE: usize = 1024 * 1024;

/// Expands `${NAME}` and `${NAME:-fallback}` references in configuration text.
///
/// An unset variable without a fallback is an error. Names are upper-case
/// identifiers of at most 128 characters.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	if input.len() > MAX_CONFIG_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration is {} bytes, the limit is {}",
			input.len(),
			MAX_CONFIG_SIZE
		)));
	}

	let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Bad variable pattern: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut copied = 0;
	for captures in pattern.captures_iter(input) {
		let (Some(reference), Some(name)) = (captures.get(0), captures.get(1)) else {
			continue;
		};

		let value = std::env::var(name.as_str())
			.ok()
			.or_else(|| captures.get(2).map(|fallback| fallback.as_str().to_string()))
			.ok_or_else(|| {
				ConfigError::Validation(format!(
					"Environment variable '{}' is not set and has no default",
					name.as_str()
				))
			})?;

		resolved.push_str(&input[copied..reference.start()]);
		resolved.push_str(&value);
		copied = reference.end();
	}
	resolved.push_str(&input[copied..]);

	Ok(resolved)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Points the http transport at `base_url` and makes it primary.
	///
	/// Keeps any other settings already present in the http table.
	pub fn override_base_url(&mut self, base_url: &str) {
		let entry = self
			.transport
			.implementations
			.entry(DEFAULT_TRANSPORT.to_string())
			.or_insert_with(|| toml::Value::Table(toml::map::Map::new()));

		if let toml::Value::Table(table) = entry {
			table.insert(
				"base_url".to_string(),
				toml::Value::String(base_url.to_string()),
			);
		} else {
			let mut table = toml::map::Map::new();
			table.insert(
				"base_url".to_string(),
				toml::Value::String(base_url.to_string()),
			);
			*entry = toml::Value::Table(table);
		}

		self.transport.primary = DEFAULT_TRANSPORT.to_string();
	}

	/// Validates the configuration.
	///
	/// - The primary transport name is not empty
	/// - The primary transport has a configuration table
	/// - The datetime format is a valid `strftime` pattern
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.transport.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Transport primary implementation cannot be empty".into(),
			));
		}

		if !self
			.transport
			.implementations
			.contains_key(&self.transport.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary transport '{}' not found in implementations",
				self.transport.primary
			)));
		}

		if !is_valid_datetime_format(&self.lookup.datetime_format) {
			return Err(ConfigError::Validation(format!(
				"Invalid datetime_format '{}'",
				self.lookup.datetime_format
			)));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
