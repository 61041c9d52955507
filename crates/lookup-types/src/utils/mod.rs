//! Utility functions for display formatting.

pub mod formatting;

pub use formatting::{
	format_timestamp, format_timestamp_in, is_valid_datetime_format, truncate_id,
	DEFAULT_DATETIME_FORMAT, PLACEHOLDER,
};
