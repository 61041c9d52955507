//! Core lookup logic.
//!
//! This crate ties the pieces of a lookup together: the identifier input slot,
//! the fetch session with its display state, the normalizer that turns snake
//! or camel order bodies into [`lookup_types::OrderRecord`], and the text view.

pub mod builder;
pub mod input;
pub mod normalize;
pub mod response;
pub mod session;
pub mod view;

pub use builder::{SessionBuilder, SessionError};
pub use input::InputController;
pub use normalize::{normalize_order, NormalizeError};
pub use session::OrderFetchSession;
pub use view::{render, ViewOptions};
