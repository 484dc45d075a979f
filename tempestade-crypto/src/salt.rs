//! Installation salt management.

use crate::error::CryptoResult;
use crate::key::Salt;
use crate::random::SecureRandom;
use std::sync::Arc;
use tempestade_storage::KeyValueStore;
use tracing::{debug, info};

/// Storage slot holding the base64 installation salt.
pub const SALT_STORAGE_KEY: &str = "tempestadelocal_salt";

/// Owns the single persisted salt of an installation.
///
/// The salt is created on first use and then only ever read. A present but
/// unreadable value is reported as [`CryptoError::CorruptSalt`](crate::CryptoError::CorruptSalt)
/// and left in place; regenerating it would silently orphan every sealed record.
#[derive(Clone)]
pub struct SaltManager {
    store: Arc<dyn KeyValueStore>,
    rng: Arc<dyn SecureRandom>,
    slot: String,
}

impl SaltManager {
    pub fn new(store: Arc<dyn KeyValueStore>, rng: Arc<dyn SecureRandom>) -> Self {
        Self::with_slot(store, rng, SALT_STORAGE_KEY)
    }

    /// Uses a custom storage slot instead of [`SALT_STORAGE_KEY`].
    pub fn with_slot(
        store: Arc<dyn KeyValueStore>,
        rng: Arc<dyn SecureRandom>,
        slot: impl Into<String>,
    ) -> Self {
        Self {
            store,
            rng,
            slot: slot.into(),
        }
    }

    /// Returns the persisted salt without creating one.
    pub fn current(&self) -> CryptoResult<Option<Salt>> {
        self.store
            .get(&self.slot)?
            .map(|encoded| Salt::from_base64(&encoded))
            .transpose()
    }

    /// Returns the persisted salt, generating and persisting it on first use.
    ///
    /// The candidate salt is written with [`KeyValueStore::set_if_absent`], so
    /// managers racing on the same store (clones or not) all end up with the
    /// one salt that was persisted. The generate branch performs exactly one
    /// storage write.
    pub fn get_or_create(&self) -> CryptoResult<Salt> {
        if let Some(salt) = self.current()? {
            return Ok(salt);
        }

        let candidate = Salt::random(self.rng.as_ref());
        match self.store.set_if_absent(&self.slot, &candidate.to_base64())? {
            None => {
                info!("created installation salt in slot {}", self.slot);
                Ok(candidate)
            }
            Some(existing) => {
                debug!("salt in slot {} created concurrently, using it", self.slot);
                Salt::from_base64(&existing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;
    use crate::random::SeededRandom;
    use std::sync::Barrier;
    use std::time::Duration;
    use tempestade_storage::{MemoryStore, StorageResult};

    /// Memory store whose reads are slow enough for racing callers to all
    /// miss the salt before any of them writes it.
    struct SlowReads(MemoryStore);

    impl KeyValueStore for SlowReads {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            std::thread::sleep(Duration::from_millis(50));
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.0.set(key, value)
        }

        fn set_if_absent(&self, key: &str, value: &str) -> StorageResult<Option<String>> {
            self.0.set_if_absent(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            self.0.remove(key)
        }
    }

    fn manager(store: Arc<MemoryStore>) -> SaltManager {
        SaltManager::new(store, Arc::new(SeededRandom::new(42)))
    }

    #[test]
    fn creates_once_and_reuses() {
        let store = Arc::new(MemoryStore::new());
        let salts = manager(store.clone());

        let first = salts.get_or_create().unwrap();
        let second = salts.get_or_create().unwrap();

        assert_eq!(first, second);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn current_does_not_create() {
        let store = Arc::new(MemoryStore::new());
        let salts = manager(store.clone());
        assert_eq!(salts.current().unwrap(), None);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn new_instance_reads_persisted_salt() {
        let store = Arc::new(MemoryStore::new());
        let first = manager(store.clone()).get_or_create().unwrap();

        let fresh = SaltManager::new(store.clone(), Arc::new(SeededRandom::new(999)));
        assert_eq!(fresh.get_or_create().unwrap(), first);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn corrupt_salt_is_reported_and_kept() {
        let store = Arc::new(MemoryStore::new());
        store.set(SALT_STORAGE_KEY, "dG9vLXNob3J0").unwrap();
        let salts = manager(store.clone());

        assert!(matches!(salts.get_or_create(), Err(CryptoError::CorruptSalt(_))));
        assert_eq!(store.get(SALT_STORAGE_KEY).unwrap().as_deref(), Some("dG9vLXNob3J0"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn concurrent_first_calls_agree() {
        let store = Arc::new(MemoryStore::new());
        let salts = SaltManager::new(store.clone(), Arc::new(crate::random::OsRandom));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let salts = salts.clone();
                std::thread::spawn(move || salts.get_or_create().unwrap())
            })
            .collect();
        let results: Vec<Salt> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn custom_slot_is_isolated() {
        let store = Arc::new(MemoryStore::new());
        let a = SaltManager::with_slot(store.clone(), Arc::new(SeededRandom::new(1)), "a");
        let b = SaltManager::with_slot(store.clone(), Arc::new(SeededRandom::new(2)), "b");
        assert_ne!(a.get_or_create().unwrap(), b.get_or_create().unwrap());
    }

    #[test]
    fn independent_managers_racing_agree() {
        let store = Arc::new(SlowReads(MemoryStore::new()));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                // Separately constructed managers share nothing but the store.
                let salts = SaltManager::new(store.clone(), Arc::new(crate::random::OsRandom));
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    salts.get_or_create().unwrap()
                })
            })
            .collect();
        let results: Vec<Salt> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let persisted = SaltManager::new(store.clone(), Arc::new(SeededRandom::new(0)))
            .current()
            .unwrap()
            .unwrap();
        assert_eq!(results, vec![persisted, persisted]);
        assert_eq!(store.0.write_count(), 1);
    }
}
