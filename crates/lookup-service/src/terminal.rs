//! Interactive prompt.
//!
//! Each line read from stdin is either a command or an identifier to look up.
//! Lookups run as spawned tasks so the prompt keeps reading while a request is
//! in flight. A renderer task prints the view every time the session state
//! changes.

use lookup_core::{render, InputController, OrderFetchSession, ViewOptions};
use lookup_types::SessionState;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinSet;

const BANNER: &str = "Enter an orderUID to look it up (:clear to reset, :quit to exit)";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
	Lookup(&'a str),
	Clear,
	Quit,
}

impl<'a> Command<'a> {
	fn parse(line: &'a str) -> Self {
		match line.trim() {
			":clear" => Command::Clear,
			":quit" | ":q" => Command::Quit,
			_ => Command::Lookup(line),
		}
	}
}

/// Runs the prompt on stdin and stdout until `:quit` or end of input.
pub async fn run(session: Arc<OrderFetchSession>, options: ViewOptions) -> std::io::Result<()> {
	let stdin = BufReader::new(tokio::io::stdin());
	prompt(session, options, stdin, tokio::io::stdout()).await?;
	Ok(())
}

/// Reads commands from `lines_in` and renders the session into `out`.
///
/// At end of input, lookups still running are awaited and their result is
/// rendered before returning. `:quit` cancels them instead. Returns the writer
/// once the renderer has printed the final state.
async fn prompt<R, W>(
	session: Arc<OrderFetchSession>,
	options: ViewOptions,
	lines_in: R,
	mut out: W,
) -> std::io::Result<W>
where
	R: AsyncBufRead + Unpin,
	W: AsyncWrite + Send + Unpin + 'static,
{
	out.write_all(format!("{}\n", BANNER).as_bytes()).await?;
	out.flush().await?;
	let renderer = tokio::spawn(render_loop(session.subscribe(), options, out));

	let mut input = InputController::new();
	let mut lookups = JoinSet::new();
	let mut lines = lines_in.lines();

	let quit = loop {
		let Some(line) = lines.next_line().await? else {
			break false;
		};
		while lookups.try_join_next().is_some() {}

		match Command::parse(&line) {
			Command::Quit => break true,
			Command::Clear => {
				input.clear();
				session.reset();
			},
			Command::Lookup(text) => {
				input.set(text);
				let session = Arc::clone(&session);
				let order_uid = input.value().to_string();
				lookups.spawn(async move {
					session.fetch(&order_uid).await;
				});
			},
		}
	};

	if quit {
		lookups.shutdown().await;
	} else {
		tracing::debug!(running = lookups.len(), "Input closed, waiting for lookups");
		while lookups.join_next().await.is_some() {}
	}

	// The renderer stops once the last session handle is gone
	drop(session);
	renderer
		.await
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
}

/// Writes the rendered view to `out` on every state change.
///
/// Returns the writer once the session is gone.
async fn render_loop<W>(
	mut states: watch::Receiver<SessionState>,
	options: ViewOptions,
	mut out: W,
) -> std::io::Result<W>
where
	W: AsyncWrite + Unpin,
{
	while states.changed().await.is_ok() {
		let text = render(&states.borrow_and_update(), &options);
		if text.is_empty() {
			continue;
		}
		out.write_all(format!("{}\n", text).as_bytes()).await?;
		out.flush().await?;
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use lookup_transport::implementations::fixture::FixtureTransport;
	use std::time::Duration;

	#[test]
	fn test_parse_commands() {
		assert_eq!(Command::parse(":quit"), Command::Quit);
		assert_eq!(Command::parse(" :q "), Command::Quit);
		assert_eq!(Command::parse(":clear"), Command::Clear);
		assert_eq!(Command::parse("abc"), Command::Lookup("abc"));
		assert_eq!(Command::parse("  "), Command::Lookup("  "));
	}

	fn order_body(uid: &str) -> String {
		format!(r#"{{"order_uid":"{}","track_number":"WBILMTESTTRACK"}}"#, uid)
	}

	#[tokio::test(start_paused = true)]
	async fn test_end_of_input_waits_for_lookup() {
		let transport = FixtureTransport::new().with_delayed_response(
			"slow",
			200,
			order_body("slow"),
			Duration::from_millis(300),
		);
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));

		let out = prompt(session, ViewOptions::default(), &b"slow\n"[..], Vec::new())
			.await
			.unwrap();
		let out = String::from_utf8(out).unwrap();

		assert!(out.starts_with(BANNER));
		assert!(out.contains("Order slow\n"));
		assert!(out.ends_with("Items\n  No items\n"));
	}

	#[tokio::test(start_paused = true)]
	async fn test_quit_cancels_lookup() {
		let transport = FixtureTransport::new().with_delayed_response(
			"slow",
			200,
			order_body("slow"),
			Duration::from_secs(30),
		);
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));

		let out = prompt(session, ViewOptions::default(), &b"slow\n:quit\n"[..], Vec::new())
			.await
			.unwrap();
		let out = String::from_utf8(out).unwrap();

		assert!(!out.contains("Order slow"));
	}

	#[tokio::test]
	async fn test_last_lookup_rendered_after_clear() {
		let transport = FixtureTransport::new().with_response("abc", 200, order_body("abc"));
		let session = Arc::new(OrderFetchSession::new(Arc::new(transport)));

		let out = prompt(session, ViewOptions::default(), &b":clear\n\nabc\n"[..], Vec::new())
			.await
			.unwrap();
		let out = String::from_utf8(out).unwrap();

		assert!(out.ends_with("Items\n  No items\n"));
		assert!(out.contains("Order abc\n"));
	}

	#[tokio::test]
	async fn test_render_loop_prints_result() {
		let transport = FixtureTransport::new().with_response(
			"abc",
			200,
			r#"{"order_uid":"abc","track_number":"WBILMTESTTRACK"}"#,
		);
		let session = OrderFetchSession::new(Arc::new(transport));
		let renderer = tokio::spawn(render_loop(
			session.subscribe(),
			ViewOptions::default(),
			Vec::new(),
		));

		session.fetch("abc").await;
		drop(session);

		let out = String::from_utf8(renderer.await.unwrap().unwrap()).unwrap();
		assert!(out.contains("Order abc\n"));
		assert!(out.contains("Track number: WBILMTESTTRACK"));
	}

	#[tokio::test]
	async fn test_render_loop_prints_errors() {
		let session = OrderFetchSession::new(Arc::new(FixtureTransport::new()));
		let renderer = tokio::spawn(render_loop(
			session.subscribe(),
			ViewOptions::default(),
			Vec::new(),
		));

		session.fetch("unknown").await;
		drop(session);

		let out = String::from_utf8(renderer.await.unwrap().unwrap()).unwrap();
		assert!(out.ends_with("Error: order not found\n"));
	}
}
