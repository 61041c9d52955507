//! Registry trait for self-registering implementations.
//!
//! Each pluggable implementation declares the name it is configured under and
//! the factory that builds it.

/// Base trait for implementation registries.
///
/// Each implementation module must provide a Registry struct that implements
/// this trait, declaring its configuration name and a factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This matches the key used in the TOML configuration, for example
	/// "http" for `transport.implementations.http`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
