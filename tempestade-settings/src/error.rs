//! Settings error types.

use tempestade_crypto::CryptoError;
use tempestade_storage::StorageError;
use thiserror::Error;

/// What the user sees when the key cannot be recovered, whatever the cause.
pub const LOCKED_MESSAGE: &str = "wrong master password or no key configured";

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    /// No stored key, wrong password, or an unreadable record.
    /// Deliberately not broken down further.
    #[error("wrong master password or no key configured")]
    Locked,

    #[error("vault error: {0}")]
    Vault(CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

impl From<CryptoError> for SettingsError {
    fn from(error: CryptoError) -> Self {
        if error.is_authentication_failure() {
            Self::Locked
        } else {
            Self::Vault(error)
        }
    }
}
