//! Terminal prompts. Nothing typed here is echoed.

use anyhow::{bail, Result};
use tempestade_crypto::Zeroizing;

/// Asks for the API key to store.
pub fn api_key() -> Result<Zeroizing<String>> {
    let key = Zeroizing::new(rpassword::prompt_password("API key: ")?);
    let trimmed = key.trim();
    if trimmed.is_empty() {
        bail!("API key cannot be empty");
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}

/// Asks for a new master password twice.
pub fn new_master_password() -> Result<Zeroizing<String>> {
    let password = Zeroizing::new(rpassword::prompt_password("Master password: ")?);
    if password.is_empty() {
        bail!("master password cannot be empty");
    }
    let confirm = Zeroizing::new(rpassword::prompt_password("Confirm master password: ")?);
    if *password != *confirm {
        bail!("passwords don't match");
    }
    Ok(password)
}

/// Asks for the master password once.
pub fn master_password() -> Result<Zeroizing<String>> {
    Ok(Zeroizing::new(rpassword::prompt_password("Master password: ")?))
}
