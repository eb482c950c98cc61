//! Storage key prefixes for persisted collections.

/// Key prefixes for the persisted collections.
///
/// Replaces raw string literals in storage calls with typed variants.
/// An order persists under `order-<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPrefix {
	/// Prefix for order records.
	Orders,
}

impl KeyPrefix {
	/// Returns the literal prefix prepended to record ids.
	pub fn as_str(&self) -> &'static str {
		match self {
			KeyPrefix::Orders => "order-",
		}
	}
}

impl From<KeyPrefix> for &'static str {
	fn from(prefix: KeyPrefix) -> Self {
		prefix.as_str()
	}
}
