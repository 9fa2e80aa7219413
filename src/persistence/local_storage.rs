//! Settings in browser LocalStorage

use super::{PersistError, SettingsStore};

/// LocalStorage key
const STORAGE_KEY: &str = "boing_settings";

/// Browser LocalStorage slot
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistError::Storage("LocalStorage unavailable".to_string()))
    }
}

impl SettingsStore for LocalStorageStore {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Self::storage()?
            .get_item(STORAGE_KEY)
            .map_err(|e| PersistError::Storage(format!("{:?}", e)))
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistError> {
        Self::storage()?
            .set_item(STORAGE_KEY, contents)
            .map_err(|e| PersistError::Storage(format!("{:?}", e)))
    }

    fn describe(&self) -> String {
        format!("localStorage['{}']", STORAGE_KEY)
    }
}
