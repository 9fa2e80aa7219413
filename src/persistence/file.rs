//! Settings file in the per-user config directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PersistError, SettingsStore};

const APP_DIR: &str = "boing";
const FILE_NAME: &str = "settings.json";

/// Per-user settings path.
///
/// Windows uses `%APPDATA%`, elsewhere `$XDG_CONFIG_HOME` or `~/.config`. Falls back
/// to `./.boing` when no home directory is known.
pub fn default_config_path() -> PathBuf {
    let env_dir = |name: &str| {
        std::env::var_os(name)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    };

    let base = if cfg!(windows) {
        env_dir("APPDATA").or_else(|| env_dir("USERPROFILE").map(|p| p.join("AppData").join("Roaming")))
    } else {
        env_dir("XDG_CONFIG_HOME").or_else(|| env_dir("HOME").map(|p| p.join(".config")))
    };

    match base {
        Some(dir) => dir.join(APP_DIR).join(FILE_NAME),
        None => PathBuf::from(".boing").join(FILE_NAME),
    }
}

/// JSON settings file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_config_path`]
    pub fn user_default() -> Self {
        Self::new(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
