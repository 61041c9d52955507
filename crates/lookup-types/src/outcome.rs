//! Outcome of a lookup and the display state derived from it.

use crate::order::OrderRecord;

/// Message shown when the submitted identifier is blank.
pub const EMPTY_ORDER_UID_MESSAGE: &str = "Please enter orderUID";

/// Message used when no better description of a failed request is available.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch order";

/// Result of one fetch attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
	/// The backend returned a record.
	Success(OrderRecord),
	/// Failure status, transport failure or an unreadable success body.
	RequestError(String),
	/// The identifier failed a local precondition; no request was made.
	ValidationError(String),
}

impl FetchOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, FetchOutcome::Success(_))
	}

	/// User-visible error text, if this outcome is an error.
	pub fn error_message(&self) -> Option<&str> {
		match self {
			FetchOutcome::Success(_) => None,
			FetchOutcome::RequestError(message) | FetchOutcome::ValidationError(message) => {
				Some(message)
			},
		}
	}
}

/// What the view currently displays.
///
/// A single tagged value, so loading and error can never be shown together.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
	#[default]
	Idle,
	Loading,
	Success(OrderRecord),
	Error(String),
}

impl SessionState {
	pub fn is_loading(&self) -> bool {
		matches!(self, SessionState::Loading)
	}
}

impl From<FetchOutcome> for SessionState {
	fn from(outcome: FetchOutcome) -> Self {
		match outcome {
			FetchOutcome::Success(record) => SessionState::Success(record),
			FetchOutcome::RequestError(message) | FetchOutcome::ValidationError(message) => {
				SessionState::Error(message)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_outcome_into_state() {
		let state: SessionState =
			FetchOutcome::ValidationError(EMPTY_ORDER_UID_MESSAGE.to_string()).into();
		assert_eq!(state, SessionState::Error(EMPTY_ORDER_UID_MESSAGE.to_string()));

		let state: SessionState = FetchOutcome::RequestError("order not found".to_string()).into();
		assert_eq!(state, SessionState::Error("order not found".to_string()));
	}

	#[test]
	fn test_error_message() {
		let outcome = FetchOutcome::RequestError("internal error".to_string());
		assert_eq!(outcome.error_message(), Some("internal error"));
		assert!(!outcome.is_success());
		assert!(SessionState::default() == SessionState::Idle);
	}
}
