//! String formatting utilities.
//!
//! Provides the placeholder shown for missing values, timestamp rendering in
//! the local time zone and identifier truncation for log lines.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Shown in place of any value the backend did not send.
pub const PLACEHOLDER: &str = "-";

/// Default `strftime` pattern for payment timestamps.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Utility function to truncate an identifier for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	if id.chars().count() <= 8 {
		id.to_string()
	} else {
		let head: String = id.chars().take(8).collect();
		format!("{}..", head)
	}
}

/// Returns true if `format` is a non-empty `strftime` pattern chrono accepts.
pub fn is_valid_datetime_format(format: &str) -> bool {
	!format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Formats seconds since the Unix epoch as a date-time in `tz`.
///
/// Returns `None` for timestamps outside chrono's range or an invalid pattern.
pub fn format_timestamp_in<Tz>(secs: i64, tz: &Tz, format: &str) -> Option<String>
where
	Tz: TimeZone,
	Tz::Offset: Display,
{
	if !is_valid_datetime_format(format) {
		return None;
	}

	let utc = DateTime::from_timestamp(secs, 0)?;
	Some(utc.with_timezone(tz).format(format).to_string())
}

/// Formats seconds since the Unix epoch as a local date-time.
pub fn format_timestamp(secs: i64, format: &str) -> Option<String> {
	format_timestamp_in(secs, &Local, format)
}
