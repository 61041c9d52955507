//! Fetch session: one lookup at a time, as seen by the view.
//!
//! The session owns the display state (Idle, Loading, Success or Error) and
//! publishes every change on a watch channel. Lookups may overlap; each one
//! takes a new generation number when it starts, and its result is committed
//! only while that generation is still the newest. An older lookup finishing
//! late is discarded, so the state always reflects the last lookup started.

use crate::response::interpret_response;
use lookup_transport::TransportInterface;
use lookup_types::{truncate_id, FetchOutcome, SessionState, EMPTY_ORDER_UID_MESSAGE};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Drives lookups against a transport and tracks the display state.
pub struct OrderFetchSession {
	transport: Arc<dyn TransportInterface>,
	state: watch::Sender<SessionState>,
	generation: AtomicU64,
}

impl OrderFetchSession {
	/// Creates an idle session.
	pub fn new(transport: Arc<dyn TransportInterface>) -> Self {
		let (state, _) = watch::channel(SessionState::Idle);
		Self {
			transport,
			state,
			generation: AtomicU64::new(0),
		}
	}

	/// Current display state.
	pub fn state(&self) -> SessionState {
		self.state.borrow().clone()
	}

	/// Receiver that observes every state change.
	pub fn subscribe(&self) -> watch::Receiver<SessionState> {
		self.state.subscribe()
	}

	/// Returns to Idle and discards any lookup still in flight.
	pub fn reset(&self) {
		self.begin(SessionState::Idle);
	}

	/// Looks up `order_uid` and returns the outcome of this call.
	///
	/// A blank identifier is rejected without contacting the backend. Otherwise
	/// the state is Loading before the request goes out, and the outcome is
	/// committed unless a newer lookup or a reset started in the meantime. The
	/// returned outcome always belongs to this call, committed or not.
	pub async fn fetch(&self, order_uid: &str) -> FetchOutcome {
		if order_uid.trim().is_empty() {
			let outcome = FetchOutcome::ValidationError(EMPTY_ORDER_UID_MESSAGE.to_string());
			self.begin(outcome.clone().into());
			return outcome;
		}

		let generation = self.begin(SessionState::Loading);
		let mut guard = LoadingGuard {
			session: self,
			generation,
			settled: false,
		};
		tracing::info!(order_uid = %truncate_id(order_uid), generation, "Fetching order");

		let outcome = match self.transport.get_order(order_uid).await {
			Ok(response) => interpret_response(&response, order_uid),
			Err(e) => {
				tracing::warn!(order_uid = %truncate_id(order_uid), error = %e, "Order request failed");
				FetchOutcome::RequestError(e.to_string())
			},
		};

		if guard.settle(outcome.clone().into()) {
			tracing::debug!(generation, success = outcome.is_success(), "Committed");
		} else {
			tracing::debug!(generation, "Discarding superseded result");
		}

		outcome
	}

	/// Starts a new generation with `state` and returns its number.
	fn begin(&self, state: SessionState) -> u64 {
		let mut generation = 0;
		self.state.send_modify(|current| {
			generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
			*current = state;
		});
		generation
	}

	/// Replaces the state if `generation` is still the newest.
	fn commit(&self, generation: u64, state: SessionState) -> bool {
		self.state.send_if_modified(|current| {
			if self.generation.load(Ordering::SeqCst) != generation {
				return false;
			}
			*current = state;
			true
		})
	}
}

/// Leaves Loading exactly once for a lookup.
///
/// If the lookup future is dropped before it settles, the state goes back to
/// Idle unless a newer lookup owns it.
struct LoadingGuard<'a> {
	session: &'a OrderFetchSession,
	generation: u64,
	settled: bool,
}

impl LoadingGuard<'_> {
	fn settle(&mut self, state: SessionState) -> bool {
		self.settled = true;
		self.session.commit(self.generation, state)
	}
}

impl Drop for LoadingGuard<'_> {
	fn drop(&mut self) {
		if !self.settled && self.session.commit(self.generation, SessionState::Idle) {
			tracing::debug!(generation = self.generation, "Lookup cancelled");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use lookup_transport::implementations::fixture::FixtureTransport;
	use lookup_transport::{TransportError, TransportResponse};
	use lookup_types::{ConfigSchema, FETCH_FAILED_MESSAGE};
	use mockall::mock;
	use std::time::Duration;

	mock! {
		Transport {}

		#[async_trait]
		impl TransportInterface for Transport {
			fn config_schema(&self) -> Box<dyn ConfigSchema>;
			async fn get_order(&self, order_uid: &str) -> Result<TransportResponse, TransportError>;
		}
	}

	fn order_body(uid: &str) -> String {
		format!(r#"{{"order_uid":"{}","track_number":"TRACK-{}"}}"#, uid, uid)
	}

	fn committed_uid(session: &OrderFetchSession) -> Option<String> {
		match session.state() {
			SessionState::Success(record) => Some(record.order_uid),
			_ => None,
		}
	}

	#[tokio::test]
	async fn test_blank_identifier_skips_transport() {
		let mut transport = MockTransport::new();
		transport.expect_get_order().never();
		let session = OrderFetchSession::new(Arc::new(transport));

		for input in ["", "   ", "\t\n"] {
			let outcome = session.fetch(input).await;
			assert_eq!(
				outcome,
				FetchOutcome::ValidationError(EMPTY_ORDER_UID_MESSAGE.to_string())
			);
			assert_eq!(
				session.state(),
				SessionState::Error(EMPTY_ORDER_UID_MESSAGE.to_string())
			);
		}
	}

	#[tokio::test]
	async fn test_one_request_per_lookup() {
		let mut transport = MockTransport::new();
		transport
			.expect_get_order()
			.withf(|uid| uid.to_string() == "b563feb7b2b84b6test")
			.times(1)
			.returning(|uid| Ok(TransportResponse::new(200, order_body(uid))));
		let session = OrderFetchSession::new(Arc::new(transport));

		let outcome = session.fetch("b563feb7b2b84b6test").await;
		assert!(outcome.is_success());
		assert_eq!(committed_uid(&session).as_deref(), Some("b563feb7b2b84b6test"));
	}

	#[tokio::test]
	async fn test_transport_error() {
		let mut transport = MockTransport::new();
		transport
			.expect_get_order()
			.times(1)
			.returning(|_| Err(TransportError::Network("connection refused".to_string())));
		let session = OrderFetchSession::new(Arc::new(transport));

		let outcome = session.fetch("abc").await;
		let message = outcome.error_message().unwrap().to_string();
		assert!(message.contains("connection refused"));
		assert_eq!(session.state(), SessionState::Error(message));
	}

	#[tokio::test]
	async fn test_error_statuses() {
		let transport = FixtureTransport::new()
			.with_response("broken", 500, "")
			.with_response("gateway", 502, "Bad Gateway");
		let session = OrderFetchSession::new(Arc::new(transport));

		session.fetch("missing").await;
		assert_eq!(
			session.state(),
			SessionState::Error("order not found".to_string())
		);

		session.fetch("broken").await;
		assert_eq!(
			session.state(),
			SessionState::Error(FETCH_FAILED_MESSAGE.to_string())
		);

		session.fetch("gateway").await;
		assert_eq!(session.state(), SessionState::Error("Bad Gateway".to_string()));
	}

	#[tokio::test]
	async fn test_success_replaces_error() {
		let transport = FixtureTransport::new().with_response("abc", 200, order_body("abc"));
		let session = OrderFetchSession::new(Arc::new(transport));

		session.fetch("").await;
		assert!(matches!(session.state(), SessionState::Error(_)));

		session.fetch("abc").await;
		assert_eq!(committed_uid(&session).as_deref(), Some("abc"));
	}

	#[tokio::test(start_paused = true)]
	async fn test_loading_is_observable() {
		let transport = FixtureTransport::new().with_delayed_response(
			"abc",
			200,
			order_body("abc"),
			Duration::from_secs(2),
		);
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));
		let mut states = session.subscribe();

		let task = tokio::spawn({
			let session = session.clone();
			async move { session.fetch("abc").await }
		});

		states.wait_for(|state| state.is_loading()).await.unwrap();
		assert!(session.state().is_loading());

		task.await.unwrap();
		assert_eq!(committed_uid(&session).as_deref(), Some("abc"));
	}

	#[tokio::test(start_paused = true)]
	async fn test_last_started_wins() {
		let transport = Arc::new(
			FixtureTransport::new()
				.with_delayed_response("first", 200, order_body("first"), Duration::from_secs(5))
				.with_delayed_response("second", 200, order_body("second"), Duration::from_secs(1)),
		);
		let session = Arc::new(OrderFetchSession::new(transport.clone()));
		let mut states = session.subscribe();

		let first = tokio::spawn({
			let session = session.clone();
			async move { session.fetch("first").await }
		});
		states.wait_for(|state| state.is_loading()).await.unwrap();

		let second = session.fetch("second").await;
		assert!(second.is_success());
		assert_eq!(committed_uid(&session).as_deref(), Some("second"));

		// The older lookup still reports its own outcome but does not commit it
		let first = first.await.unwrap();
		assert!(first.is_success());
		assert_eq!(committed_uid(&session).as_deref(), Some("second"));
		assert_eq!(transport.request_count(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_stale_error_discarded() {
		let transport = FixtureTransport::new()
			.with_delayed_response("old", 500, "boom", Duration::from_secs(3))
			.with_response("new", 200, order_body("new"));
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));
		let mut states = session.subscribe();

		let old = tokio::spawn({
			let session = session.clone();
			async move { session.fetch("old").await }
		});
		states.wait_for(|state| state.is_loading()).await.unwrap();

		session.fetch("new").await;
		let old = old.await.unwrap();
		assert_eq!(old, FetchOutcome::RequestError("boom".to_string()));
		assert_eq!(committed_uid(&session).as_deref(), Some("new"));
	}

	#[tokio::test(start_paused = true)]
	async fn test_reset_discards_in_flight() {
		let transport = FixtureTransport::new().with_delayed_response(
			"abc",
			200,
			order_body("abc"),
			Duration::from_secs(2),
		);
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));
		let mut states = session.subscribe();

		let task = tokio::spawn({
			let session = session.clone();
			async move { session.fetch("abc").await }
		});
		states.wait_for(|state| state.is_loading()).await.unwrap();

		session.reset();
		assert_eq!(session.state(), SessionState::Idle);

		assert!(task.await.unwrap().is_success());
		assert_eq!(session.state(), SessionState::Idle);
	}

	#[tokio::test(start_paused = true)]
	async fn test_cancelled_lookup_leaves_loading() {
		let transport = FixtureTransport::new().with_delayed_response(
			"abc",
			200,
			order_body("abc"),
			Duration::from_secs(30),
		);
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));
		let mut states = session.subscribe();

		let task = tokio::spawn({
			let session = session.clone();
			async move { session.fetch("abc").await }
		});
		states.wait_for(|state| state.is_loading()).await.unwrap();

		task.abort();
		assert!(task.await.unwrap_err().is_cancelled());
		assert_eq!(session.state(), SessionState::Idle);
	}

	#[tokio::test]
	async fn test_validation_supersedes_in_flight() {
		let transport = FixtureTransport::new().with_delayed_response(
			"abc",
			200,
			order_body("abc"),
			Duration::from_millis(50),
		);
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));
		let mut states = session.subscribe();

		let task = tokio::spawn({
			let session = session.clone();
			async move { session.fetch("abc").await }
		});
		states.wait_for(|state| state.is_loading()).await.unwrap();

		session.fetch(" ").await;
		task.await.unwrap();
		assert_eq!(
			session.state(),
			SessionState::Error(EMPTY_ORDER_UID_MESSAGE.to_string())
		);
	}
}
