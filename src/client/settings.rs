use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::error::SettingsError;

pub const MIN_POLL_INTERVAL_SECONDS: u32 = 1;
pub const MAX_POLL_INTERVAL_SECONDS: u32 = 60;

const API_BASE_URL_KEY: &str = "apiBaseUrl";
const POLL_INTERVAL_KEY: &str = "pollIntervalSeconds";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub api_base_url: String,
    pub poll_interval_seconds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            poll_interval_seconds: 10,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.api_base_url.trim().is_empty() {
            return Err(SettingsError::Validation(
                "API Base URL cannot be empty".to_string(),
            ));
        }
        if !(MIN_POLL_INTERVAL_SECONDS..=MAX_POLL_INTERVAL_SECONDS)
            .contains(&self.poll_interval_seconds)
        {
            return Err(SettingsError::Validation(format!(
                "Update interval must be between {} and {} seconds",
                MIN_POLL_INTERVAL_SECONDS, MAX_POLL_INTERVAL_SECONDS
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_interval_seconds))
    }
}

/// String key-value persistence, the same shape as browser local storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), SettingsError>;
}

/// Key-value store kept as a flat JSON object in one file
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.load()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), SettingsError> {
        let mut map = self.load()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.clone());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // readers only ever see a complete file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Validated settings on top of a key-value store
pub struct SettingsStore<S> {
    kv: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Last saved settings, with defaults for keys never saved. A stored
    /// value that does not parse or validate is a `Validation` error.
    pub fn get(&self) -> Result<Settings, SettingsError> {
        let defaults = Settings::default();

        let api_base_url = self
            .kv
            .get(API_BASE_URL_KEY)?
            .unwrap_or(defaults.api_base_url);
        let poll_interval_seconds = match self.kv.get(POLL_INTERVAL_KEY)? {
            Some(raw) => raw.trim().parse().map_err(|_| {
                SettingsError::Validation(format!("Stored update interval {:?} is not a number", raw))
            })?,
            None => defaults.poll_interval_seconds,
        };

        let stored = Settings {
            api_base_url,
            poll_interval_seconds,
        };
        stored.validate()?;
        Ok(stored)
    }

    /// Like `get`, but unusable stored values fall back to the defaults.
    /// Storage failures are still errors.
    pub fn get_or_default(&self) -> Result<Settings, SettingsError> {
        match self.get() {
            Err(SettingsError::Validation(message)) => {
                log::warn!("Stored settings are invalid ({}), using defaults", message);
                Ok(Settings::default())
            }
            other => other,
        }
    }

    /// Validate and persist `candidate`. Nothing is written when validation
    /// fails.
    pub fn set(&self, candidate: Settings) -> Result<Settings, SettingsError> {
        let settings = Settings {
            api_base_url: candidate.api_base_url.trim().to_string(),
            ..candidate
        };
        settings.validate()?;

        self.kv.set_many(&[
            (API_BASE_URL_KEY, settings.api_base_url.clone()),
            (POLL_INTERVAL_KEY, settings.poll_interval_seconds.to_string()),
        ])?;
        log::info!(
            "Saved settings: api {} every {}s",
            settings.api_base_url,
            settings.poll_interval_seconds
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> SettingsStore<FileStore> {
        SettingsStore::new(FileStore::new(dir.path().join("settings.json")))
    }

    fn settings(url: &str, interval: u32) -> Settings {
        Settings {
            api_base_url: url.to_string(),
            poll_interval_seconds: interval,
        }
    }

    #[test]
    fn defaults_when_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let settings = store(&dir).get().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.poll_interval_seconds, 10);
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(matches!(
            store.set(settings("http://x", 0)),
            Err(SettingsError::Validation(_))
        ));
        assert!(matches!(
            store.set(settings("http://x", 61)),
            Err(SettingsError::Validation(_))
        ));
        assert_eq!(store.set(settings("http://x", 1)).unwrap().poll_interval_seconds, 1);
        assert_eq!(store.set(settings("http://x", 60)).unwrap().poll_interval_seconds, 60);
    }

    #[test]
    fn rejected_write_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let saved = store.set(settings("http://tracker:5000", 5)).unwrap();

        assert!(store.set(settings("http://x", 0)).is_err());
        assert!(store.set(settings("   ", 5)).is_err());
        assert_eq!(store.get().unwrap(), saved);
    }

    #[test]
    fn persists_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        store(&dir).set(settings("  http://tracker:5000 ", 30)).unwrap();

        let reopened = store(&dir).get().unwrap();
        assert_eq!(reopened, settings("http://tracker:5000", 30));
        assert_eq!(reopened.poll_interval(), Duration::from_secs(30));
    }

    fn write_raw(dir: &tempfile::TempDir, json: &str) {
        std::fs::write(dir.path().join("settings.json"), json).unwrap();
    }

    #[test]
    fn invalid_stored_values_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_raw(
            &dir,
            r#"{"apiBaseUrl": "http://tracker:9000", "pollIntervalSeconds": "0"}"#,
        );
        assert!(matches!(store(&dir).get(), Err(SettingsError::Validation(_))));

        write_raw(
            &dir,
            r#"{"apiBaseUrl": "http://tracker:9000", "pollIntervalSeconds": "soon"}"#,
        );
        assert!(matches!(store(&dir).get(), Err(SettingsError::Validation(_))));
    }

    #[test]
    fn get_or_default_recovers_from_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        write_raw(&dir, r#"{"apiBaseUrl": "  ", "pollIntervalSeconds": "30"}"#);
        assert_eq!(store(&dir).get_or_default().unwrap(), Settings::default());

        // a saved value can then replace the broken one
        store(&dir).set(settings("http://tracker:9000", 30)).unwrap();
        assert_eq!(
            store(&dir).get().unwrap(),
            settings("http://tracker:9000", 30)
        );
    }

    #[test]
    fn unreadable_file_is_not_masked() {
        let dir = tempfile::tempdir().unwrap();
        write_raw(&dir, "not json");
        assert!(matches!(
            store(&dir).get_or_default(),
            Err(SettingsError::Json(_))
        ));
    }
}
