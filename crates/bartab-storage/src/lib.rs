//! Storage module for the bartab order system.
//!
//! This module provides the injected key-value store the order core
//! persists through, supporting different backend implementations such
//! as in-memory or file-based storage. The core never talks to a
//! backend directly; it goes through the typed [`StorageService`].

use async_trait::async_trait;
use bartab_types::{ConfigSchema, ImplementationRegistry, KeyPrefix};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The requested key has no record.
	#[error("Not found")]
	NotFound,
	/// Serialization or deserialization of a record failed.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The storage backend rejected a read or write.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Backend configuration failed validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// Any backend that wants to hold order records implements this. It is
/// a plain key-value surface: get, set, remove, existence check, and
/// prefix enumeration for diagnostics.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, overwriting any previous
	/// value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key. Deleting a
	/// missing key is not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Enumerates every stored key starting with the given prefix.
	async fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed records with
/// automatic JSON serialization. Keys are formed by prepending the
/// collection prefix to the record id, e.g. `order-ORD-XXXXXXXXX`.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(prefix: KeyPrefix, id: &str) -> String {
		format!("{}{}", prefix.as_str(), id)
	}

	/// Stores a serializable record, creating or overwriting it.
	pub async fn store<T: Serialize>(
		&self,
		prefix: KeyPrefix,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = Self::key(prefix, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		tracing::debug!(key = %key, size = bytes.len(), "storing record");
		self.backend.set_bytes(&key, bytes).await
	}

	/// Retrieves and deserializes a record from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		prefix: KeyPrefix,
		id: &str,
	) -> Result<T, StorageError> {
		let key = Self::key(prefix, id);
		let bytes = self.backend.get_bytes(&key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Removes a record from storage. Idempotent.
	pub async fn remove(&self, prefix: KeyPrefix, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(prefix, id)).await
	}

	/// Checks if a record exists in storage.
	pub async fn exists(&self, prefix: KeyPrefix, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(prefix, id)).await
	}

	/// Enumerates the ids of every record under the given prefix.
	pub async fn ids(&self, prefix: KeyPrefix) -> Result<Vec<String>, StorageError> {
		let keys = self.backend.keys(prefix.as_str()).await?;
		Ok(keys
			.into_iter()
			.map(|key| key[prefix.as_str().len()..].to_string())
			.collect())
	}
}
