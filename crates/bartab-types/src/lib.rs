//! Common types for the bartab order system.
//!
//! This module defines the core data types shared across the workspace:
//! the persistent order entity and its lifecycle state, catalog records,
//! identifier generation, and the configuration validation framework
//! used by pluggable storage backends.

/// Catalog records, the demo menu, and the search filter.
pub mod catalog;
/// Order, line item, payment, and lifecycle state types.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage key prefixes for persisted collections.
pub mod storage;
/// Identifier and timestamp helpers.
pub mod utils;
/// Configuration validation types for type-safe TOML configs.
pub mod validation;

// Re-export the common types for convenient access
pub use order::*;
pub use registry::*;
pub use storage::*;
pub use utils::{generate_order_id, line_item_id, unix_timestamp};
pub use validation::*;
