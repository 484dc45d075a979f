//! In-memory store.

use crate::error::{StorageError, StorageResult};
use crate::KeyValueStore;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Slots held in a `HashMap`, lost when the store is dropped.
///
/// Counts every write so tests can assert how many writes an operation made.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes made so far (`set` and successful `set_if_absent`).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let slots = self.slots.read().map_err(|_| StorageError::Lock)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut slots = self.slots.write().map_err(|_| StorageError::Lock)?;
        slots.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &str) -> StorageResult<Option<String>> {
        let mut slots = self.slots.write().map_err(|_| StorageError::Lock)?;
        if let Some(existing) = slots.get(key) {
            return Ok(Some(existing.clone()));
        }
        slots.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut slots = self.slots.write().map_err(|_| StorageError::Lock)?;
        slots.remove(key);
        Ok(())
    }
}
