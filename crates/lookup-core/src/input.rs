//! Identifier input slot.

/// Holds the identifier text as it is being typed.
///
/// The value is stored exactly as entered; trimming only matters for
/// [`InputController::is_blank`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputController {
	value: String,
}

impl InputController {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the whole value.
	pub fn set(&mut self, value: impl Into<String>) {
		self.value = value.into();
	}

	pub fn push(&mut self, c: char) {
		self.value.push(c);
	}

	/// Removes the last character, if any.
	pub fn backspace(&mut self) {
		self.value.pop();
	}

	pub fn clear(&mut self) {
		self.value.clear();
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	/// Whether the value is empty after trimming whitespace.
	pub fn is_blank(&self) -> bool {
		self.value.trim().is_empty()
	}
}
