//! Read-modify-write access to the persisted configuration object.

use crate::error::{SettingsError, SettingsResult};
use crate::provider::Provider;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tempestade_crypto::{EncryptedRecord, SecretVault, Zeroizing};
use tempestade_storage::KeyValueStore;
use tracing::{debug, info, warn};

/// Storage slot holding the configuration JSON.
pub const CONFIG_STORAGE_KEY: &str = "tempestadelocal_ai_config";

/// The persisted configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    /// An unrecognized provider reads as the default, so it can never cause
    /// the sealed key next to it to be dropped.
    #[serde(default, deserialize_with = "lenient_provider")]
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<EncryptedRecord>,
}

fn lenient_provider<'de, D>(deserializer: D) -> Result<Provider, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = value.as_str().and_then(|s| s.parse::<Provider>().ok());
    Ok(parsed.unwrap_or_else(|| {
        warn!("unknown provider {value} in stored settings, using {}", Provider::default());
        Provider::default()
    }))
}

/// Settings persisted through a [`KeyValueStore`], with the API key sealed
/// by a [`SecretVault`].
///
/// Writes replace the whole object. Callers that save from several tasks at
/// once must serialize those saves themselves; the last write wins.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    vault: SecretVault,
}

impl SettingsStore {
    /// Settings and vault sharing one store, production KDF parameters.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let vault = SecretVault::new(store.clone());
        Self { store, vault }
    }

    pub fn with_vault(store: Arc<dyn KeyValueStore>, vault: SecretVault) -> Self {
        Self { store, vault }
    }

    pub fn vault(&self) -> &SecretVault {
        &self.vault
    }

    /// Loads the configuration. A slot holding unparsable JSON reads as absent.
    pub fn load(&self) -> SettingsResult<Option<StoredConfig>> {
        let Some(raw) = self.store.get(CONFIG_STORAGE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                warn!("ignoring unreadable settings object: {e}");
                Ok(None)
            }
        }
    }

    fn persist(&self, config: &StoredConfig) -> SettingsResult<()> {
        let json = serde_json::to_string(config)?;
        self.store.set(CONFIG_STORAGE_KEY, &json)?;
        Ok(())
    }

    /// Selected provider, falling back to the default when nothing is stored.
    pub fn provider(&self) -> SettingsResult<Provider> {
        Ok(self.load()?.map(|c| c.provider).unwrap_or_default())
    }

    /// Changes the provider, keeping any stored key.
    pub fn set_provider(&self, provider: Provider) -> SettingsResult<()> {
        let mut config = self.load()?.unwrap_or_default();
        config.provider = provider;
        self.persist(&config)?;
        debug!("provider set to {provider}");
        Ok(())
    }

    /// Whether an encrypted key is stored. Says nothing about whether any
    /// password can open it.
    pub fn has_stored_key(&self) -> SettingsResult<bool> {
        Ok(self
            .load()?
            .is_some_and(|c| c.encrypted_key.is_some()))
    }

    /// Seals `api_key` under `master_password` and replaces the stored record.
    pub fn save_api_key(
        &self,
        api_key: &str,
        master_password: &str,
        provider: Provider,
    ) -> SettingsResult<()> {
        let record = self.vault.seal(api_key, master_password)?;
        self.store_record(record, provider)
    }

    /// [`save_api_key`](Self::save_api_key) with the derivation on the blocking pool.
    pub async fn save_api_key_async(
        &self,
        api_key: impl Into<Zeroizing<String>>,
        master_password: impl Into<Zeroizing<String>>,
        provider: Provider,
    ) -> SettingsResult<()> {
        let record = self.vault.seal_async(api_key, master_password).await?;
        self.store_record(record, provider)
    }

    fn store_record(&self, record: EncryptedRecord, provider: Provider) -> SettingsResult<()> {
        let mut config = self.load()?.unwrap_or_default();
        config.provider = provider;
        config.encrypted_key = Some(record);
        self.persist(&config)?;
        info!("stored encrypted API key for provider {provider}");
        Ok(())
    }

    /// Recovers the stored API key.
    ///
    /// "No key stored" and "wrong password" are both [`SettingsError::Locked`].
    pub fn decrypted_key(&self, master_password: &str) -> SettingsResult<Zeroizing<String>> {
        let record = self.stored_record()?;
        Ok(self.vault.open(&record, master_password)?)
    }

    /// [`decrypted_key`](Self::decrypted_key) with the derivation on the blocking pool.
    pub async fn decrypted_key_async(
        &self,
        master_password: impl Into<Zeroizing<String>>,
    ) -> SettingsResult<Zeroizing<String>> {
        let record = self.stored_record()?;
        Ok(self.vault.open_async(record, master_password).await?)
    }

    fn stored_record(&self) -> SettingsResult<EncryptedRecord> {
        self.load()?
            .and_then(|c| c.encrypted_key)
            .ok_or(SettingsError::Locked)
    }

    /// Removes the whole configuration object, encrypted key included.
    /// The installation salt is left alone.
    pub fn clear(&self) -> SettingsResult<()> {
        self.store.remove(CONFIG_STORAGE_KEY)?;
        info!("cleared stored settings");
        Ok(())
    }
}
