//! Interpretation of backend responses.
//!
//! Turns the status and body text a transport returned into a
//! [`FetchOutcome`]. Non-2xx responses surface the backend's own error text,
//! 2xx bodies go through [`normalize_order`].

use crate::normalize::normalize_order;
use lookup_transport::TransportResponse;
use lookup_types::{FetchOutcome, FETCH_FAILED_MESSAGE};
use serde_json::Value;

/// Maps a backend response for `order_uid` to an outcome.
pub fn interpret_response(response: &TransportResponse, order_uid: &str) -> FetchOutcome {
	if !response.is_success() {
		let message = error_message(&response.body);
		tracing::warn!(status = response.status, error = %message, "Backend rejected lookup");
		return FetchOutcome::RequestError(message);
	}

	let body: Value = match serde_json::from_str(&response.body) {
		Ok(body) => body,
		Err(e) => {
			tracing::warn!(error = %e, "Order body is not valid JSON");
			return FetchOutcome::RequestError(FETCH_FAILED_MESSAGE.to_string());
		},
	};

	match normalize_order(&body, order_uid) {
		Ok(record) => FetchOutcome::Success(record),
		Err(e) => {
			tracing::warn!(error = %e, "Order body could not be normalized");
			FetchOutcome::RequestError(FETCH_FAILED_MESSAGE.to_string())
		},
	}
}

/// Error text of a non-2xx body.
///
/// A JSON object with a string `error` field yields that field, or
/// [`FETCH_FAILED_MESSAGE`] when the field is empty. Anything else is surfaced
/// verbatim, and a blank body also yields [`FETCH_FAILED_MESSAGE`].
pub fn error_message(body: &str) -> String {
	if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
		match object.get("error").and_then(Value::as_str) {
			Some("") => return FETCH_FAILED_MESSAGE.to_string(),
			Some(message) => return message.to_string(),
			None => {},
		}
	}

	if body.trim().is_empty() {
		FETCH_FAILED_MESSAGE.to_string()
	} else {
		body.to_string()
	}
}
