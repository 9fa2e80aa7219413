//! Settings persistence
//!
//! Features:
//! - Versioned JSON record with an explicit schema
//! - Field-granular recovery (a bad field falls back to its default, the rest survive)
//! - Storage backends: JSON file on native, LocalStorage on web, in-memory for tests

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::settings::{Action, Controls, KeyCode, Settings};

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::{FileStore, default_config_path};
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Current schema version of the settings record
pub const SETTINGS_VERSION: u32 = 1;

/// Persistence errors
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Storage backend unavailable or rejected the write
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A place settings can be read from and written to
pub trait SettingsStore {
    /// Raw stored record, `None` when nothing has been saved yet
    fn read(&self) -> Result<Option<String>, PersistError>;

    /// Replace the stored record
    fn write(&mut self, contents: &str) -> Result<(), PersistError>;

    /// Human readable location for logs
    fn describe(&self) -> String;
}

/// On-disk shape of the settings record
#[derive(Serialize)]
struct SettingsRecord<'a> {
    version: u32,
    #[serde(flatten)]
    settings: &'a Settings,
}

/// Serialize settings into the versioned record
pub fn encode_settings(settings: &Settings) -> Result<String, PersistError> {
    let record = SettingsRecord {
        version: SETTINGS_VERSION,
        settings,
    };
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Decode a settings record, falling back to defaults for anything unusable
pub fn decode_settings(contents: &str) -> Settings {
    let defaults = Settings::default();

    let root = match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            log::warn!("Settings record is not an object ({}), using defaults", kind(&other));
            return defaults;
        }
        Err(e) => {
            log::warn!("Settings record is corrupt ({}), using defaults", e);
            return defaults;
        }
    };

    match root.get("version").and_then(Value::as_u64) {
        Some(v) if v == SETTINGS_VERSION as u64 => {}
        Some(v) => log::warn!("Settings record version {} (expected {}), reading known fields", v, SETTINGS_VERSION),
        None => log::warn!("Settings record has no version, reading known fields"),
    }

    Settings {
        ai_difficulty: field(&root, "ai_difficulty", defaults.ai_difficulty),
        particle_quality: field(&root, "particle_quality", defaults.particle_quality),
        sound: field(&root, "sound", defaults.sound),
        controls: decode_controls(root.get("controls"), defaults.controls),
    }
}

/// Decode one field, keeping `default` when missing or malformed
fn field<T: DeserializeOwned>(root: &Map<String, Value>, name: &str, default: T) -> T {
    match root.get(name) {
        None => {
            log::warn!("Settings field '{}' missing, using default", name);
            default
        }
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Settings field '{}' invalid ({}), using default", name, e);
                default
            }
        },
    }
}

/// Decode bindings per action. Explicit `null` stays unbound; missing or malformed
/// entries take the default binding.
fn decode_controls(value: Option<&Value>, defaults: Controls) -> Controls {
    let Some(Value::Object(map)) = value else {
        if value.is_some() {
            log::warn!("Settings field 'controls' is not an object, using default bindings");
        }
        return defaults;
    };

    let mut controls = defaults;
    for action in Action::ALL {
        match map.get(action.key()) {
            None => {}
            Some(Value::Null) => controls.set(action, None),
            Some(Value::String(code)) if !code.is_empty() => {
                controls.set(action, Some(KeyCode::new(code.as_str())))
            }
            Some(other) => {
                log::warn!(
                    "Binding '{}' invalid ({}), using default",
                    action.key(),
                    kind(other)
                );
            }
        }
    }
    controls
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// In-memory store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
    /// Reject writes (for exercising failure paths)
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes always fail
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn with_contents(contents: &str) -> Self {
        let store = Self::new();
        *store.slot.borrow_mut() = Some(contents.to_string());
        store
    }

    /// Current stored record
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistError> {
        if self.read_only {
            return Err(PersistError::Storage("memory store is read-only".to_string()));
        }
        *self.slot.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, ParticleQuality};

    fn custom() -> Settings {
        let mut s = Settings {
            ai_difficulty: Difficulty::Hard,
            particle_quality: ParticleQuality::Low,
            sound: false,
            ..Settings::default()
        };
        s.controls.set(Action::Debug, None);
        s.controls.set(Action::Reset, Some(KeyCode::new("Backquote")));
        s
    }

    #[test]
    fn test_round_trip_preserves_unbound() {
        let settings = custom();
        let json = encode_settings(&settings).unwrap();
        let loaded = decode_settings(&json);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.controls.get(Action::Debug), None);
    }

    #[test]
    fn test_record_is_versioned() {
        let json = encode_settings(&Settings::default()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], SETTINGS_VERSION);
        assert_eq!(value["ai_difficulty"], "Normal");
        assert_eq!(value["controls"]["left_up"], "KeyW");
    }

    #[test]
    fn test_corrupt_record_falls_back_to_defaults() {
        assert_eq!(decode_settings("not json {"), Settings::default());
        assert_eq!(decode_settings("[1, 2, 3]"), Settings::default());
        assert_eq!(decode_settings(""), Settings::default());
    }

    #[test]
    fn test_partial_corruption_keeps_valid_fields() {
        let json = r#"{
            "version": 1,
            "ai_difficulty": "Impossible",
            "particle_quality": "High",
            "sound": "loud",
            "controls": { "left_up": "KeyI", "left_down": 42, "debug": null }
        }"#;
        let s = decode_settings(json);
        assert_eq!(s.ai_difficulty, Difficulty::Normal);
        assert_eq!(s.particle_quality, ParticleQuality::High);
        assert!(s.sound);
        assert_eq!(s.controls.get(Action::LeftUp), Some(&KeyCode::new("KeyI")));
        assert_eq!(s.controls.get(Action::LeftDown), Some(&KeyCode::new("KeyS")));
        assert_eq!(s.controls.get(Action::Debug), None);
        assert_eq!(s.controls.get(Action::Menu), Some(&KeyCode::new("KeyM")));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let settings = custom();
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_read_only_store_reports_error() {
        let mut store = MemoryStore::read_only();
        let err = Settings::default().save(&mut store).unwrap_err();
        assert!(matches!(err, PersistError::Storage(_)));
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
