//! Persisted AI settings for Tempestade.
//!
//! One configuration object lives in a single storage slot:
//!
//! ```json
//! {"provider": "openrouter", "encryptedKey": {"version": 1, "nonce": "...", "ciphertext": "..."}}
//! ```
//!
//! The provider choice is plain data. The API key only ever exists here as a
//! sealed [`EncryptedRecord`](tempestade_crypto::EncryptedRecord); the master
//! password is passed into each call and never kept.

mod error;
mod provider;
mod store;

pub use error::{SettingsError, SettingsResult, LOCKED_MESSAGE};
pub use provider::Provider;
pub use store::{SettingsStore, StoredConfig, CONFIG_STORAGE_KEY};
