//! Password-based key derivation.

use crate::error::{CryptoError, CryptoResult};
use crate::random::SecureRandom;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Lowest PBKDF2 round count accepted outside of tests.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Per-installation salt mixed into every derivation.
///
/// Public, non-secret value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Draws a fresh salt from `rng`.
    pub fn random(rng: &dyn SecureRandom) -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    /// Standard base64, the persisted form.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parses the persisted form. Anything other than base64 of exactly
    /// [`SALT_SIZE`] bytes is [`CryptoError::CorruptSalt`].
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::CorruptSalt(format!("not base64: {e}")))?;
        let bytes: [u8; SALT_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::CorruptSalt(format!(
                "expected {SALT_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&self.to_base64()).finish()
    }
}

/// 256-bit key derived from a password. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: MIN_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Custom round count; must be at least [`MIN_ITERATIONS`].
    pub fn new(iterations: u32) -> CryptoResult<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(CryptoError::KeyDerivation(format!(
                "iteration count {iterations} below minimum {MIN_ITERATIONS}"
            )));
        }
        Ok(Self { iterations })
    }

    /// Skips the round-count floor so tests run quickly.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn insecure_for_tests(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// Derives a 256-bit key with PBKDF2-HMAC-SHA256.
///
/// Deliberately slow: at the default round count this is tens of
/// milliseconds of CPU even in release builds.
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> DerivedKey {
    let mut out = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), params.iterations, &mut out);
    let key = DerivedKey(out);
    out.zeroize();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    // RFC 7914 §11 PBKDF2-HMAC-SHA256 test vector ("passwd", "salt", c = 1).
    #[test]
    fn matches_known_vector() {
        let mut out = [0u8; 64];
        pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut out);
        assert_eq!(
            &out[..8],
            &[0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f]
        );
    }

    #[test]
    fn same_inputs_same_key() {
        let salt = Salt::from_bytes([3u8; SALT_SIZE]);
        let params = KdfParams::insecure_for_tests(10);
        let a = derive_key("hunter2", &salt, &params);
        let b = derive_key("hunter2", &salt, &params);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn salt_changes_key() {
        let params = KdfParams::insecure_for_tests(10);
        let a = derive_key("hunter2", &Salt::from_bytes([1u8; SALT_SIZE]), &params);
        let b = derive_key("hunter2", &Salt::from_bytes([2u8; SALT_SIZE]), &params);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn default_params_meet_floor() {
        assert_eq!(KdfParams::default().iterations(), MIN_ITERATIONS);
    }

    #[test]
    fn rejects_low_iteration_count() {
        assert!(matches!(
            KdfParams::new(MIN_ITERATIONS - 1),
            Err(CryptoError::KeyDerivation(_))
        ));
        assert_eq!(KdfParams::new(200_000).unwrap().iterations(), 200_000);
    }

    #[test]
    fn salt_base64_round_trip() {
        let salt = Salt::random(&SeededRandom::new(1));
        let encoded = salt.to_base64();
        assert_eq!(Salt::from_base64(&encoded).unwrap(), salt);
    }

    #[test]
    fn salt_wrong_length_is_corrupt() {
        let encoded = STANDARD.encode([0u8; 15]);
        assert!(matches!(Salt::from_base64(&encoded), Err(CryptoError::CorruptSalt(_))));
    }

    #[test]
    fn salt_bad_base64_is_corrupt() {
        assert!(matches!(Salt::from_base64("%%%not-base64"), Err(CryptoError::CorruptSalt(_))));
    }

    #[test]
    fn derived_key_debug_is_redacted() {
        let key = DerivedKey::from_bytes([0xAB; KEY_SIZE]);
        let shown = format!("{key:?}");
        assert!(!shown.contains("171"));
        assert!(shown.contains("REDACTED"));
    }
}
