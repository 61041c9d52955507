//! Common types module for the order lookup tool.
//!
//! This module defines the canonical order snapshot, the outcome of a single
//! lookup and the display state shared between the fetch session and the view.
//! It also hosts the configuration schema helpers used by pluggable transports.

/// Canonical order snapshot produced by normalization.
pub mod order;
/// Fetch outcomes and the display state machine.
pub mod outcome;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Utility functions for display formatting.
pub mod utils;
/// Configuration validation types for implementation-specific settings.
pub mod validation;

pub use order::*;
pub use outcome::*;
pub use registry::ImplementationRegistry;
pub use utils::{
	format_timestamp, format_timestamp_in, is_valid_datetime_format, truncate_id,
	DEFAULT_DATETIME_FORMAT, PLACEHOLDER,
};
pub use validation::*;
