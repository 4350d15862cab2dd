use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::Result;

/// Name of both the config folder and the nested alarm asset folder.
pub const FOLDER_NAME: &str = "[custom_alarms]";

const SETTINGS_FILE: &str = "settings.json";

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex =
        Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("Invalid filename regex");
}

/// Replace characters that can't appear in a file name, path separators
/// included, with `_`.
pub fn file_safe(name: &str) -> Cow<'_, str> {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_")
}

/// Engine settings shared by every character profile.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Minimum seconds between two alarms for the same unique
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: u64,
    /// Speech language passed to the synthesizer
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_slow_speech")]
    pub slow_speech: bool,
    #[serde(default = "default_synthesis_timeout")]
    pub synthesis_timeout_seconds: u64,
}

fn default_cooldown() -> u64 {
    5
}

fn default_language() -> String {
    "en".to_string()
}

fn default_slow_speech() -> bool {
    true
}

fn default_synthesis_timeout() -> u64 {
    10
}

impl Settings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cooldown_seconds: default_cooldown(),
            language: default_language(),
            slow_speech: default_slow_speech(),
            synthesis_timeout_seconds: default_synthesis_timeout(),
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            config_path: config_dir.join(SETTINGS_FILE),
        }
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                if let Ok(settings) = serde_json::from_str(&content) {
                    return settings;
                }
                log::warn!("Ignoring malformed settings at {:?}", self.config_path);
            }
        }
        Settings::default()
    }

    /// Like `load`, but writes the defaults out on first run so there is a
    /// file to edit.
    pub fn load_or_init(&self) -> Settings {
        if self.config_path.exists() {
            return self.load();
        }
        let settings = Settings::default();
        match self.save(&settings) {
            Ok(()) => log::info!("Default settings written to {:?}", self.config_path),
            Err(e) => log::warn!("Could not write default settings: {}", e),
        }
        settings
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)?;
        Ok(())
    }
}

/// Where profiles and cached alarm audio live.
#[derive(Debug, Clone)]
pub struct AlarmPaths {
    config_dir: PathBuf,
    asset_dir: PathBuf,
}

impl AlarmPaths {
    pub fn new(base_dir: &Path) -> Self {
        let config_dir = base_dir.join(FOLDER_NAME);
        let asset_dir = config_dir.join(FOLDER_NAME);
        Self {
            config_dir,
            asset_dir,
        }
    }

    /// `$HOME/.config`, or the working directory when no home is set.
    pub fn default_base_dir() -> PathBuf {
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Create both folders if missing. Only actual creations are logged.
    pub fn ensure(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
            log::info!(
                "[Custom Alarms] v.{} ~ config folder created.",
                env!("CARGO_PKG_VERSION")
            );
        }
        if !self.asset_dir.exists() {
            fs::create_dir_all(&self.asset_dir)?;
            log::info!(
                "[Custom Alarms] v.{} ~ alarm folder created.",
                env!("CARGO_PKG_VERSION")
            );
        }
        Ok(())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path());

        let default = manager.load();
        assert_eq!(default.cooldown_seconds, 5);
        assert_eq!(default.language, "en");

        let new_settings = Settings {
            cooldown_seconds: 12,
            language: "de".to_string(),
            slow_speech: false,
            synthesis_timeout_seconds: 3,
        };

        manager.save(&new_settings).unwrap();
        assert_eq!(manager.load(), new_settings);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{ "language": "fr" }"#).unwrap();

        let settings = ConfigManager::new(dir.path()).load();
        assert_eq!(settings.language, "fr");
        assert_eq!(settings.cooldown(), Duration::from_secs(5));
        assert!(settings.slow_speech);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();

        assert_eq!(ConfigManager::new(dir.path()).load(), Settings::default());
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path());

        assert_eq!(manager.load_or_init(), Settings::default());
        assert!(dir.path().join(SETTINGS_FILE).is_file());

        fs::write(dir.path().join(SETTINGS_FILE), r#"{ "cooldown_seconds": 9 }"#).unwrap();
        assert_eq!(manager.load_or_init().cooldown_seconds, 9);
    }

    #[test]
    fn test_file_safe() {
        assert_eq!(file_safe("Lord Yarkan"), "Lord Yarkan");
        assert_eq!(file_safe("a/b\\c:d?"), "a_b_c_d_");
        assert_eq!(file_safe("../up"), ".._up");
    }

    #[test]
    fn test_paths_are_nested_and_idempotent() {
        let dir = tempdir().unwrap();
        let paths = AlarmPaths::new(dir.path());

        assert_eq!(paths.config_dir(), dir.path().join("[custom_alarms]"));
        assert_eq!(
            paths.asset_dir(),
            dir.path().join("[custom_alarms]").join("[custom_alarms]")
        );

        paths.ensure().unwrap();
        paths.ensure().unwrap();
        assert!(paths.asset_dir().is_dir());
    }
}
