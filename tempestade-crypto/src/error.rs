//! Vault error types.

use tempestade_storage::StorageError;
use thiserror::Error;

/// Result type for vault operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while sealing or opening a secret.
///
/// Messages never include key material, plaintext, or cipher internals.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The persisted salt exists but cannot be decoded to 16 bytes.
    /// Fatal: existing records can no longer be opened.
    #[error("persisted salt is corrupt: {0}")]
    CorruptSalt(String),

    /// Wrong password, changed salt, or a damaged record.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// A stored record field is not valid base64 or has the wrong length.
    #[error("record encoding error: {0}")]
    Encoding(String),

    #[error("unsupported record version: {0}")]
    UnsupportedVersion(u32),

    #[error("secret must not be empty")]
    EmptySecret,

    #[error("key derivation error: {0}")]
    KeyDerivation(String),

    #[error("encryption failed")]
    Encryption,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("vault task failed: {0}")]
    Task(String),
}

impl CryptoError {
    /// Whether the caller should treat this as "cannot recover the secret
    /// with this record and password" and re-prompt.
    #[must_use]
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::Encoding(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failed_message_is_opaque() {
        assert_eq!(CryptoError::AuthenticationFailed.to_string(), "authentication failed");
    }

    #[test]
    fn encoding_counts_as_authentication_failure() {
        assert!(CryptoError::Encoding("bad base64".into()).is_authentication_failure());
        assert!(CryptoError::AuthenticationFailed.is_authentication_failure());
        assert!(!CryptoError::CorruptSalt("short".into()).is_authentication_failure());
    }
}
