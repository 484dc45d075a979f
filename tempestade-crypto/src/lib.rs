//! Local secret vault for Tempestade.
//!
//! Protects a single third-party API key on the user's own device with a
//! master password:
//! - PBKDF2-HMAC-SHA256 (100,000 rounds) for key derivation
//! - AES-256-GCM for authenticated encryption
//! - A per-installation salt owned by [`SaltManager`]
//!
//! # Architecture
//!
//! 1. **Salt**: 16 random bytes created once per installation and persisted
//!    through a [`KeyValueStore`](tempestade_storage::KeyValueStore). Records
//!    do not carry the salt, so replacing it makes every existing record
//!    unrecoverable.
//!
//! 2. **Derived key**: recomputed from (password, salt) inside every
//!    [`SecretVault::seal`] and [`SecretVault::open`] call and zeroized when
//!    the call returns. It is never stored.
//!
//! 3. **Encrypted record**: `{version, nonce, ciphertext}` with base64 byte
//!    fields. The only thing that leaves the vault.
//!
//! A failed [`SecretVault::open`] never says why: wrong password, changed
//! salt and tampered bytes all surface as [`CryptoError::AuthenticationFailed`].

mod cipher;
mod error;
mod key;
mod random;
mod record;
mod salt;
mod vault;

pub use cipher::{decrypt, encrypt, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DerivedKey, KdfParams, Salt, KEY_SIZE, MIN_ITERATIONS, SALT_SIZE};
pub use random::{OsRandom, SecureRandom, SeededRandom};
pub use record::{DecodedRecord, EncryptedRecord, RECORD_VERSION};
pub use salt::{SaltManager, SALT_STORAGE_KEY};
pub use vault::SecretVault;

pub use zeroize::Zeroizing;
