//! Main entry point for the order lookup tool.
//!
//! Looks up orders by their orderUID against the order backend. With an
//! ORDER_UID argument it performs one lookup and prints the result; without
//! one it starts an interactive prompt that accepts one identifier per line.

use clap::Parser;
use lookup_config::Config;
use lookup_core::{render, SessionBuilder};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod terminal;

/// Command-line arguments for the lookup tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file (built-in defaults when omitted)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	/// Base URL of the order backend, overrides the configured http transport
	#[arg(short, long, env = "ORDER_LOOKUP_BASE_URL")]
	base_url: Option<String>,

	/// Order to look up; starts the interactive prompt when omitted
	order_uid: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// Logs go to stderr so stdout only carries the rendered view
	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	let config = load_config(&args).await?;
	tracing::info!(
		transport = %config.transport.primary,
		"Loaded configuration"
	);

	let (session, options) = SessionBuilder::new(config).build()?;

	match args.order_uid {
		Some(order_uid) => {
			let outcome = session.fetch(&order_uid).await;
			println!("{}", render(&session.state(), &options));
			Ok(if outcome.is_success() {
				ExitCode::SUCCESS
			} else {
				ExitCode::FAILURE
			})
		},
		None => {
			terminal::run(Arc::new(session), options).await?;
			tracing::info!("Stopped order lookup");
			Ok(ExitCode::SUCCESS)
		},
	}
}

/// Loads the configuration file if one was given and applies CLI overrides.
async fn load_config(args: &Args) -> Result<Config, lookup_config::ConfigError> {
	let mut config = match &args.config {
		Some(path) => Config::from_file(path).await?,
		None => Config::default(),
	};

	if let Some(base_url) = &args.base_url {
		config.override_base_url(base_url);
	}

	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use lookup_config::DEFAULT_BASE_URL;

	#[test]
	fn test_args_defaults() {
		let args = Args::try_parse_from(["order-lookup"]).unwrap();
		assert!(args.config.is_none());
		assert_eq!(args.log_level, "warn");
		assert!(args.order_uid.is_none());
	}

	#[test]
	fn test_args_one_shot() {
		let args = Args::try_parse_from([
			"order-lookup",
			"-c",
			"config/demo.toml",
			"--log-level",
			"debug",
			"-b",
			"http://orders.internal:9000",
			"b563feb7b2b84b6test",
		])
		.unwrap();
		assert_eq!(args.config, Some(PathBuf::from("config/demo.toml")));
		assert_eq!(args.log_level, "debug");
		assert_eq!(args.base_url.as_deref(), Some("http://orders.internal:9000"));
		assert_eq!(args.order_uid.as_deref(), Some("b563feb7b2b84b6test"));
	}

	#[tokio::test]
	async fn test_load_default_config() {
		let args = Args::try_parse_from(["order-lookup", "--base-url", "http://127.0.0.1:1"]).unwrap();
		let config = load_config(&args).await.unwrap();

		let http = config.transport.primary_config().unwrap();
		assert_eq!(config.transport.primary, "http");
		assert_eq!(http["base_url"].as_str(), Some("http://127.0.0.1:1"));
	}

	#[tokio::test]
	async fn test_load_without_overrides() {
		let args = Args::try_parse_from(["order-lookup"]).unwrap();
		let config = load_config(&args).await.unwrap();

		let http = config.transport.primary_config().unwrap();
		assert_eq!(http["base_url"].as_str(), Some(DEFAULT_BASE_URL));
	}

	#[tokio::test]
	async fn test_load_missing_config_file() {
		let args = Args::try_parse_from(["order-lookup", "-c", "/nonexistent/lookup.toml"]).unwrap();
		assert!(load_config(&args).await.is_err());
	}
}
