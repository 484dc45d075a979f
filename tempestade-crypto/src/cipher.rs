//! AES-256-GCM authenticated encryption.
//!
//! The tag is appended to the ciphertext (the AEAD's standard output layout).
//! No associated data is bound.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use zeroize::Zeroizing;

/// Nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// GCM tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts `plaintext`. The caller guarantees `nonce` is never reused with `key`.
pub fn encrypt(key: &DerivedKey, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::Encryption)
}

/// Decrypts and verifies. Any verification failure is
/// [`CryptoError::AuthenticationFailed`]; no partial plaintext is returned.
pub fn decrypt(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::AuthenticationFailed)
}
