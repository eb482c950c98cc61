//! Registry trait for self-registering implementations.
//!
//! Pluggable backend modules provide a Registry struct implementing
//! this trait, declaring the name they go by in configuration together
//! with a factory function.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this
	/// implementation, e.g. "memory" or "file" for storage backends.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory function for this implementation.
	fn factory() -> Self::Factory;
}
