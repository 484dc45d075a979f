//! Random sources for salts and nonces.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;
use std::sync::Mutex;

/// Source of random bytes for salts and nonces.
///
/// Injected into [`SaltManager`](crate::SaltManager) and
/// [`SecretVault`](crate::SecretVault) so tests can substitute a
/// reproducible source.
pub trait SecureRandom: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Thread-local CSPRNG seeded from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::rng().fill_bytes(dest);
    }
}

/// Deterministic source for reproducible test fixtures.
///
/// Two instances with the same seed yield the same byte stream, which means
/// the same nonces. Never use it to seal real secrets.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandom").finish_non_exhaustive()
    }
}

impl SecureRandom for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.fill_bytes(dest);
    }
}
