//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable implementation module provides a `Registry` struct that
/// implements this trait, declaring the name it is configured under and the
/// factory that builds it.
pub trait ImplementationRegistry {
	/// The key used in configuration files, e.g. `"http"` for
	/// `api.implementations.http`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory function for this implementation.
	fn factory() -> Self::Factory;
}
