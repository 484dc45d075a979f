//! Key/value persistence for Tempestade.
//!
//! The vault and the settings layer only ever need a handful of named string
//! slots (the installation salt, the configuration object). This crate provides
//! that contract plus two backends:
//!
//! - [`MemoryStore`] for tests and ephemeral sessions
//! - [`FileStore`] for a single JSON file on disk, rewritten atomically

mod error;
mod file;
mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// A small set of named string slots.
///
/// Implementations must be safe to share across threads. A `set` fully
/// replaces the previous value of the slot; there are no partial updates.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Stores `value` under `key` only if the slot is empty, atomically with
    /// respect to every other call on this store.
    ///
    /// Returns `None` when `value` was written, or the value already present
    /// (left untouched) otherwise.
    fn set_if_absent(&self, key: &str, value: &str) -> StorageResult<Option<String>>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Whether a value is stored under `key`.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
