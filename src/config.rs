//! Persisted settings
//!
//! Lives in `<config dir>/config.json`. A missing or unreadable file never
//! stops the timer from starting; it just falls back to defaults.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};

use crate::{countdown::DEFAULT_REFRESH_INTERVAL, error::Result, notify::NotificationPreferences};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_CONFIG_DIR: &str = "countdown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub refresh_interval_ms: u64,
    pub theme: String,
    pub notifications: NotificationPreferences,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL.as_millis() as u64,
            theme: "default".into(),
            notifications: NotificationPreferences::default(),
        }
    }
}

impl AppConfig {
    /// Never zero; a zero interval would spin the event loop.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(10))
    }
}

/// Loads and saves [`AppConfig`] inside one directory
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Defaults when the file is missing or corrupt.
    pub fn load(&self) -> AppConfig {
        let path = self.path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(_) => {
                info!(path = %path.display(), "no configuration file, using defaults");
                return AppConfig::default();
            }
        };

        match serde_json::from_str::<AppConfig>(&json) {
            Ok(mut config) => {
                config.notifications.normalize();
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse configuration, using defaults");
                AppConfig::default()
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.path(), serde_json::to_string_pretty(config)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested"));
        assert_eq!(store.load(), AppConfig::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert_eq!(ConfigStore::new(dir.path()).load(), AppConfig::default());
    }

    #[test]
    fn saved_preferences_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("countdown"));
        let mut config = AppConfig::default();
        config.notifications.sound = false;
        config.notifications.sound_file = PathBuf::from("/tmp/bell.wav");
        config.refresh_interval_ms = 250;

        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "notifications": { "popup": false, "tray": false, "sound": false } }"#,
        )
        .unwrap();

        let config = ConfigStore::new(dir.path()).load();
        assert_eq!(config.refresh_interval_ms, 100);
        assert!(!config.notifications.enabled);
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        let config = AppConfig {
            refresh_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_millis(10));
    }
}
