//! Seal and open the stored secret.

use crate::cipher::{decrypt, encrypt, NONCE_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, KdfParams};
use crate::random::{OsRandom, SecureRandom};
use crate::record::EncryptedRecord;
use crate::salt::SaltManager;
use std::fmt;
use std::sync::Arc;
use tempestade_storage::KeyValueStore;
use tracing::debug;
use zeroize::Zeroizing;

/// Password-protected secret vault.
///
/// Stateless apart from the installation salt: every call derives its key
/// from scratch and drops it before returning. Cloning is cheap and clones
/// share the same salt manager.
///
/// Both operations are CPU-bound for tens of milliseconds by design. Call
/// them off latency-sensitive threads, or use [`seal_async`](Self::seal_async)
/// and [`open_async`](Self::open_async).
#[derive(Clone)]
pub struct SecretVault {
    salts: SaltManager,
    rng: Arc<dyn SecureRandom>,
    kdf: KdfParams,
}

impl SecretVault {
    /// Vault over `store` using OS randomness and default KDF parameters.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_random(store, Arc::new(OsRandom))
    }

    /// Vault drawing salt and nonces from `rng`.
    pub fn with_random(store: Arc<dyn KeyValueStore>, rng: Arc<dyn SecureRandom>) -> Self {
        Self::from_salt_manager(SaltManager::new(store, rng.clone()), rng)
    }

    pub fn from_salt_manager(salts: SaltManager, rng: Arc<dyn SecureRandom>) -> Self {
        Self {
            salts,
            rng,
            kdf: KdfParams::default(),
        }
    }

    #[must_use]
    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn salt_manager(&self) -> &SaltManager {
        &self.salts
    }

    pub fn kdf_params(&self) -> KdfParams {
        self.kdf
    }

    /// Encrypts `secret` under a key derived from `password`.
    ///
    /// Creates the installation salt on first use. Every call draws a fresh
    /// nonce, so sealing the same inputs twice gives unrelated records.
    pub fn seal(&self, secret: &str, password: &str) -> CryptoResult<EncryptedRecord> {
        if secret.is_empty() {
            return Err(CryptoError::EmptySecret);
        }

        let salt = self.salts.get_or_create()?;
        let key = derive_key(password, &salt, &self.kdf);

        let mut nonce = [0u8; NONCE_SIZE];
        self.rng.fill_bytes(&mut nonce);

        let ciphertext = encrypt(&key, &nonce, secret.as_bytes())?;
        debug!("sealed secret into {} ciphertext bytes", ciphertext.len());

        Ok(EncryptedRecord::from_parts(&nonce, &ciphertext))
    }

    /// Recovers the secret sealed in `record`.
    ///
    /// Wrong password, a salt that changed since sealing, and any damage to
    /// the record all return [`CryptoError::AuthenticationFailed`].
    /// [`CryptoError::CorruptSalt`] and storage failures pass through.
    pub fn open(&self, record: &EncryptedRecord, password: &str) -> CryptoResult<Zeroizing<String>> {
        let Some(salt) = self.salts.current()? else {
            debug!("open attempted before any salt exists");
            return Err(CryptoError::AuthenticationFailed);
        };

        let decoded = match record.decode() {
            Ok(decoded) => decoded,
            Err(CryptoError::Encoding(reason)) => {
                debug!("stored record undecodable: {reason}");
                return Err(CryptoError::AuthenticationFailed);
            }
            Err(e) => return Err(e),
        };

        let key = derive_key(password, &salt, &self.kdf);
        let plaintext = decrypt(&key, &decoded.nonce, &decoded.ciphertext)?;

        let text = std::str::from_utf8(&plaintext).map_err(|_| CryptoError::AuthenticationFailed)?;
        Ok(Zeroizing::new(text.to_owned()))
    }

    /// [`seal`](Self::seal) on the blocking thread pool.
    ///
    /// Inputs are taken by value and wiped once the derivation finishes.
    pub async fn seal_async(
        &self,
        secret: impl Into<Zeroizing<String>>,
        password: impl Into<Zeroizing<String>>,
    ) -> CryptoResult<EncryptedRecord> {
        let vault = self.clone();
        let secret = secret.into();
        let password = password.into();
        tokio::task::spawn_blocking(move || vault.seal(&secret, &password))
            .await
            .map_err(|e| CryptoError::Task(e.to_string()))?
    }

    /// [`open`](Self::open) on the blocking thread pool.
    ///
    /// Dropping the returned future abandons the result; nothing needs cleanup.
    pub async fn open_async(
        &self,
        record: EncryptedRecord,
        password: impl Into<Zeroizing<String>>,
    ) -> CryptoResult<Zeroizing<String>> {
        let vault = self.clone();
        let password = password.into();
        tokio::task::spawn_blocking(move || vault.open(&record, &password))
            .await
            .map_err(|e| CryptoError::Task(e.to_string()))?
    }
}

impl fmt::Debug for SecretVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretVault")
            .field("kdf", &self.kdf)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::salt::SALT_STORAGE_KEY;
    use proptest::prelude::*;
    use tempestade_storage::MemoryStore;

    fn fast_vault(store: Arc<MemoryStore>) -> SecretVault {
        SecretVault::new(store).with_kdf_params(KdfParams::insecure_for_tests(16))
    }

    #[test]
    fn round_trip() {
        let vault = fast_vault(Arc::new(MemoryStore::new()));
        let record = vault.seal("sk-test-1234", "correct horse").unwrap();
        assert_eq!(vault.open(&record, "correct horse").unwrap().as_str(), "sk-test-1234");
    }

    #[test]
    fn empty_secret_rejected() {
        let vault = fast_vault(Arc::new(MemoryStore::new()));
        assert!(matches!(vault.seal("", "pw"), Err(CryptoError::EmptySecret)));
    }

    #[test]
    fn empty_password_still_works() {
        let vault = fast_vault(Arc::new(MemoryStore::new()));
        let record = vault.seal("secret", "").unwrap();
        assert_eq!(vault.open(&record, "").unwrap().as_str(), "secret");
        assert!(vault.open(&record, " ").is_err());
    }

    #[test]
    fn open_without_salt_fails_closed() {
        let sealing = fast_vault(Arc::new(MemoryStore::new()));
        let record = sealing.seal("secret", "pw").unwrap();

        let empty = fast_vault(Arc::new(MemoryStore::new()));
        assert!(matches!(empty.open(&record, "pw"), Err(CryptoError::AuthenticationFailed)));
        assert_eq!(empty.salt_manager().current().unwrap(), None);
    }

    #[test]
    fn malformed_record_looks_like_wrong_password() {
        let vault = fast_vault(Arc::new(MemoryStore::new()));
        let mut record = vault.seal("secret", "pw").unwrap();
        record.nonce = "!!".into();
        assert!(matches!(vault.open(&record, "pw"), Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn corrupt_salt_is_fatal_for_both_operations() {
        let store = Arc::new(MemoryStore::new());
        let vault = fast_vault(store.clone());
        let record = vault.seal("secret", "pw").unwrap();

        store.set(SALT_STORAGE_KEY, "bm9wZQ==").unwrap();

        assert!(matches!(vault.open(&record, "pw"), Err(CryptoError::CorruptSalt(_))));
        assert!(matches!(vault.seal("secret", "pw"), Err(CryptoError::CorruptSalt(_))));
    }

    #[test]
    fn seeded_random_gives_reproducible_records() {
        let a = SecretVault::with_random(Arc::new(MemoryStore::new()), Arc::new(SeededRandom::new(5)))
            .with_kdf_params(KdfParams::insecure_for_tests(16));
        let b = SecretVault::with_random(Arc::new(MemoryStore::new()), Arc::new(SeededRandom::new(5)))
            .with_kdf_params(KdfParams::insecure_for_tests(16));

        assert_eq!(a.seal("fixture", "pw").unwrap(), b.seal("fixture", "pw").unwrap());
    }

    #[test]
    fn debug_does_not_expose_internals() {
        let vault = fast_vault(Arc::new(MemoryStore::new()));
        let shown = format!("{vault:?}");
        assert!(shown.starts_with("SecretVault"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn any_secret_round_trips(secret in "\\PC{1,128}", password in "\\PC{0,32}") {
            let vault = fast_vault(Arc::new(MemoryStore::new()));
            let record = vault.seal(&secret, &password).unwrap();
            let opened = vault.open(&record, &password).unwrap();
            prop_assert_eq!(opened.as_str(), secret.as_str());
        }

        #[test]
        fn other_password_never_opens(secret in "\\PC{1,64}", p1 in "\\PC{0,16}", p2 in "\\PC{0,16}") {
            prop_assume!(p1 != p2);
            let vault = fast_vault(Arc::new(MemoryStore::new()));
            let record = vault.seal(&secret, &p1).unwrap();
            prop_assert!(matches!(vault.open(&record, &p2), Err(CryptoError::AuthenticationFailed)));
        }

        #[test]
        fn any_bit_flip_is_detected(bit in 0usize..((16 + 6) * 8)) {
            let vault = fast_vault(Arc::new(MemoryStore::new()));
            let record = vault.seal("secret", "pw").unwrap();

            let mut decoded = record.decode().unwrap();
            decoded.ciphertext[bit / 8] ^= 1 << (bit % 8);
            let tampered = decoded.encode();

            prop_assert!(matches!(vault.open(&tampered, "pw"), Err(CryptoError::AuthenticationFailed)));
        }
    }

    #[tokio::test]
    async fn async_round_trip() {
        let vault = fast_vault(Arc::new(MemoryStore::new()));
        let record = vault
            .seal_async("sk-async".to_string(), "pw".to_string())
            .await
            .unwrap();
        let opened = vault.open_async(record, "pw".to_string()).await.unwrap();
        assert_eq!(opened.as_str(), "sk-async");
    }

    #[tokio::test]
    async fn concurrent_seals_are_independent() {
        let vault = fast_vault(Arc::new(MemoryStore::new()));
        let (a, b) = tokio::join!(
            vault.seal_async("same".to_string(), "pw".to_string()),
            vault.seal_async("same".to_string(), "pw".to_string()),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.nonce, b.nonce);
        assert_eq!(vault.open(&a, "pw").unwrap().as_str(), "same");
        assert_eq!(vault.open(&b, "pw").unwrap().as_str(), "same");
    }
}
