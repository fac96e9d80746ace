use super::files::{atomic_write, backup_file, read_file};
use crate::domain::AppData;
use crate::error::StoreError;
use crate::sync::SyncConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key of the slot holding the document
pub const DATA_KEY: &str = "pulse_todo_data";
/// Key of the slot holding the sync configuration
pub const CONFIG_KEY: &str = "pulse_gh_config";

/// Two independent JSON slots in the data directory, one file per key
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Stored value, or the default when the slot is missing, unreadable or corrupt.
    /// A corrupt slot is backed up first so the next save does not destroy it.
    fn load_slot<T: DeserializeOwned + Default>(&self, key: &'static str) -> T {
        let path = self.slot_path(key);
        let content = match read_file(&path) {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!(key, "slot empty, using default");
                return T::default();
            }
            Err(e) => {
                warn!(key, error = %e, "could not read slot, using default");
                return T::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                match backup_file(&path) {
                    Ok(backup) => warn!(key, error = %e, backup = %backup.display(), "corrupt slot backed up, using default"),
                    Err(backup_err) => warn!(key, error = %e, backup_error = %backup_err, "corrupt slot, using default"),
                }
                T::default()
            }
        }
    }

    fn save_slot<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize { key, source })?;
        atomic_write(self.slot_path(key), &json).map_err(|source| StoreError::Write { key, source })?;
        debug!(key, bytes = json.len(), "slot saved");
        Ok(())
    }

    pub fn load_data(&self) -> AppData {
        self.load_slot::<AppData>(DATA_KEY).normalized()
    }

    pub fn save_data(&self, data: &AppData) -> Result<(), StoreError> {
        self.save_slot(DATA_KEY, data)
    }

    pub fn load_config(&self) -> SyncConfig {
        self.load_slot(CONFIG_KEY)
    }

    pub fn save_config(&self, config: &SyncConfig) -> Result<(), StoreError> {
        self.save_slot(CONFIG_KEY, config)
    }
}
