//! The portable encrypted record.
//!
//! Textual form (embedded in the settings object):
//!
//! ```json
//! {"version": 1, "nonce": "<base64, 12 bytes>", "ciphertext": "<base64, ct || tag>"}
//! ```
//!
//! Records written before versioning have no `version` field and name the
//! nonce `iv`; both are still read as version 1.

use crate::cipher::NONCE_SIZE;
use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Current record format: PBKDF2-HMAC-SHA256 + AES-256-GCM, installation salt.
pub const RECORD_VERSION: u32 = 1;

fn unversioned() -> u32 {
    RECORD_VERSION
}

/// Encrypted secret as stored. Byte fields stay base64 until [`decode`](Self::decode)
/// so a damaged record still loads and fails only when opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    #[serde(default = "unversioned")]
    pub version: u32,
    #[serde(alias = "iv")]
    pub nonce: String,
    pub ciphertext: String,
}

/// Binary view of an [`EncryptedRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedRecord {
    /// Builds a current-version record from raw parts.
    pub fn from_parts(nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Self {
        Self {
            version: RECORD_VERSION,
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
        }
    }

    /// Checks the version and decodes both byte fields.
    pub fn decode(&self) -> CryptoResult<DecodedRecord> {
        if self.version != RECORD_VERSION {
            return Err(CryptoError::UnsupportedVersion(self.version));
        }

        let nonce = STANDARD
            .decode(self.nonce.trim())
            .map_err(|e| CryptoError::Encoding(format!("nonce: {e}")))?;
        let nonce: [u8; NONCE_SIZE] = nonce.as_slice().try_into().map_err(|_| {
            CryptoError::Encoding(format!("nonce: expected {NONCE_SIZE} bytes, got {}", nonce.len()))
        })?;

        let ciphertext = STANDARD
            .decode(self.ciphertext.trim())
            .map_err(|e| CryptoError::Encoding(format!("ciphertext: {e}")))?;

        Ok(DecodedRecord { nonce, ciphertext })
    }
}

impl DecodedRecord {
    pub fn encode(&self) -> EncryptedRecord {
        EncryptedRecord::from_parts(&self.nonce, &self.ciphertext)
    }
}
