//! JSON file store.
//!
//! All slots live in one JSON object. The file is read once at open and
//! rewritten in full on every mutation: write to a sibling temp file, fsync,
//! then rename over the previous file so readers never observe a torn file.

use crate::error::{StorageError, StorageResult};
use crate::KeyValueStore;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Slots persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store. A file that exists but is not a JSON
    /// object of strings is [`StorageError::Corrupt`]; it is never truncated.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let slots = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Corrupt(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!("opened file store at {} ({} slots)", path.display(), slots.len());

        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &BTreeMap<String, String>) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(slots)?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let slots = self.slots.lock().map_err(|_| StorageError::Lock)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Lock)?;
        let previous = slots.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&slots) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => slots.insert(key.to_string(), old),
                None => slots.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &str) -> StorageResult<Option<String>> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Lock)?;
        if let Some(existing) = slots.get(key) {
            return Ok(Some(existing.clone()));
        }
        slots.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&slots) {
            slots.remove(key);
            return Err(e);
        }
        Ok(None)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Lock)?;
        let Some(previous) = slots.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&slots) {
            slots.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
