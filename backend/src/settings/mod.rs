//! Settings store - persist the node's format pattern
//!
//! One string value under the fixed key [`KEY_NUMBER_FORMAT`], saved as a
//! JSON document validated against the embedded settings schema on load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};
use crate::validation::validate_settings;

/// Settings key of the format pattern.
pub const KEY_NUMBER_FORMAT: &str = "number_format";

/// Pattern used when nothing was configured.
pub const DEFAULT_NUMBER_FORMAT: &str = "%.3f";

/// Default settings file (relative to current dir)
pub const DEFAULT_SETTINGS_PATH: &str = ".numfmt/settings.json";

/// Persisted settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSettings {
    pub number_format: String,
    /// Last save time, RFC 3339.
    #[serde(default)]
    pub saved_at: Option<String>,
}

impl FormatSettings {
    pub fn new(number_format: impl Into<String>) -> Self {
        Self {
            number_format: number_format.into(),
            saved_at: None,
        }
    }
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self::new(DEFAULT_NUMBER_FORMAT)
    }
}

/// File-backed settings store.
///
/// Values set on the store are only written by [`SettingsStore::save`].
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: FormatSettings,
}

impl SettingsStore {
    /// Open the store at `path`, loading it if the file exists.
    pub fn open(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = if path.exists() {
            load(&path)?
        } else {
            FormatSettings::default()
        };
        Ok(Self { path, settings })
    }

    /// In-memory store, never persisted unless saved.
    pub fn in_memory(path: impl Into<PathBuf>, settings: FormatSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current format pattern.
    pub fn get(&self) -> &str {
        &self.settings.number_format
    }

    pub fn set(&mut self, pattern: impl Into<String>) {
        self.settings.number_format = pattern.into();
    }

    /// Back to [`DEFAULT_NUMBER_FORMAT`].
    pub fn reset(&mut self) {
        self.settings = FormatSettings::default();
    }

    /// Immutable copy of the current settings.
    pub fn snapshot(&self) -> FormatSettings {
        self.settings.clone()
    }

    /// Write the settings to disk, stamping `saved_at`.
    pub fn save(&mut self) -> SettingsResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        self.settings.saved_at = Some(chrono::Utc::now().to_rfc3339());
        let content = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

fn load(path: &Path) -> SettingsResult<FormatSettings> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    validate_settings(&value).map_err(SettingsError::Invalid)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.get(), DEFAULT_NUMBER_FORMAT);
        assert_eq!(store.snapshot().saved_at, None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::open(&path).unwrap();
        store.set("%08.2f");
        store.save().unwrap();

        let reloaded = SettingsStore::open(&path).unwrap();
        assert_eq!(reloaded.get(), "%08.2f");
        assert!(reloaded.snapshot().saved_at.is_some());
    }

    #[test]
    fn test_set_is_not_persisted_without_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::open(&path).unwrap();
        store.set("%e");
        assert!(!path.exists());
    }

    #[test]
    fn test_reset() {
        let mut store = SettingsStore::in_memory("unused.json", FormatSettings::new("%g"));
        store.reset();
        assert_eq!(store.get(), DEFAULT_NUMBER_FORMAT);
    }

    #[test]
    fn test_invalid_document_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"number_format": 3, "extra": true}"#).unwrap();

        match SettingsStore::open(&path) {
            Err(SettingsError::Invalid(errors)) => assert!(!errors.is_empty()),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(SettingsStore::open(&path), Err(SettingsError::Json(_))));
    }
}
