//! Per-character persistence of alarm records.
//!
//! Every mutation reloads the file, applies the change and rewrites it. There
//! is no in-memory cache between calls.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::model::{Record, ReservedFlag};
use crate::core::config::file_safe;
use crate::core::error::{AlarmError, Result};

/// Identifies whose record is read and written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profile {
    pub server: String,
    pub character: String,
}

impl Profile {
    pub fn new(server: impl Into<String>, character: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            character: character.into(),
        }
    }

    /// `[server]_character.json`, with unsafe characters replaced.
    pub fn file_name(&self) -> String {
        format!("[{}]_{}.json", file_safe(&self.server), file_safe(&self.character))
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    profile: Option<Profile>,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            profile: None,
        }
    }

    pub fn select_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Path of the active character's record file.
    pub fn record_path(&self) -> Option<PathBuf> {
        self.profile
            .as_ref()
            .map(|profile| self.config_dir.join(profile.file_name()))
    }

    /// Read the active record.
    ///
    /// Missing or malformed files read as an empty record. Missing reserved
    /// flags are added with `false` and written back right away. Never fails.
    pub fn load(&self) -> Record {
        let mut record = match self.record_path() {
            Some(path) => read_record(&path),
            None => {
                let mut record = Record::new();
                record.fill_default_flags();
                return record;
            }
        };

        let added = record.fill_default_flags();
        for flag in &added {
            log::info!("{} flag was created and set as false by default.", flag.key());
        }
        if !added.is_empty() {
            if let Err(e) = self.save(&record) {
                log::warn!("Could not persist default flags: {}", e);
            }
        }

        record
    }

    /// Write `record` for the active character, replacing the file atomically.
    pub fn save(&self, record: &Record) -> Result<()> {
        let path = self.record_path().ok_or(AlarmError::NoProfile)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = to_pretty_json(record)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn set_entity(&self, name: &str, flagged: bool) -> Result<()> {
        let mut record = self.load();
        record.set(name, flagged);
        self.save(&record)
    }

    pub fn set_flag(&self, flag: ReservedFlag, value: bool) -> Result<()> {
        self.set_entity(flag.key(), value)
    }

    /// Delete `name` from the record. Absent names are a no-op.
    pub fn remove_entity(&self, name: &str) -> Result<()> {
        let mut record = self.load();
        if record.remove(name) {
            self.save(&record)?;
        }
        Ok(())
    }

    /// Invert `name` if present and return its new value.
    ///
    /// Absent names are not created; the record is still rewritten.
    pub fn toggle_entity(&self, name: &str) -> Result<Option<bool>> {
        let mut record = self.load();
        let toggled = record.toggle(name);
        self.save(&record)?;
        Ok(toggled)
    }
}

fn read_record(path: &Path) -> Record {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Record::new(),
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        log::warn!("Record {:?} is malformed ({}), starting empty", path, e);
        Record::new()
    })
}

fn to_pretty_json(record: &Record) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    record.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> ConfigStore {
        let mut store = ConfigStore::new(dir.to_path_buf());
        store.select_profile(Profile::new("Thoth", "suspekt"));
        store
    }

    #[test]
    fn test_profile_file_name() {
        assert_eq!(
            Profile::new("Thoth", "suspekt").file_name(),
            "[Thoth]_suspekt.json"
        );
    }

    #[test]
    fn test_profile_names_stay_inside_config_dir() {
        let dir = tempdir().unwrap();
        let profile = Profile::new("Th/oth", "../evil");
        assert_eq!(profile.file_name(), "[Th_oth]_.._evil.json");

        let mut store = ConfigStore::new(dir.path().to_path_buf());
        store.select_profile(profile);
        let path = store.record_path().unwrap();
        assert_eq!(path.parent(), Some(dir.path()));

        store.set_entity("Isis", true).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_load_creates_file_with_defaults() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let record = store.load();
        assert_eq!(record.get("__mute__"), Some(false));

        let content = fs::read_to_string(store.record_path().unwrap()).unwrap();
        assert_eq!(content, "{\n    \"__mute__\": false\n}");
    }

    #[test]
    fn test_malformed_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.record_path().unwrap(), "{ \"Seth\": tru").unwrap();

        let record = store.load();
        assert_eq!(record.len(), 1);
        assert!(!record.flag(ReservedFlag::Mute));
    }

    #[test]
    fn test_save_orders_keys() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_entity("Seth", true).unwrap();
        store.set_entity("Anubis", false).unwrap();
        store.set_entity("(Titan Uniques)", true).unwrap();

        let content = fs::read_to_string(store.record_path().unwrap()).unwrap();
        let expected = "{\n    \"__mute__\": false,\n    \"(Titan Uniques)\": true,\n    \"Anubis\": false,\n    \"Seth\": true\n}";
        assert_eq!(content, expected);
    }

    #[test]
    fn test_round_trip_is_byte_stable() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let path = store.record_path().unwrap();
        fs::write(&path, r#"{"Seth": true, "__mute__": false, "Anubis": false}"#).unwrap();

        store.save(&store.load()).unwrap();
        let first = fs::read(&path).unwrap();
        store.save(&store.load()).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_toggle_only_flips_existing() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        assert_eq!(store.toggle_entity("Isis").unwrap(), None);
        assert_eq!(store.load().get("Isis"), None);

        store.set_entity("Isis", false).unwrap();
        assert_eq!(store.toggle_entity("Isis").unwrap(), Some(true));
        assert_eq!(store.load().get("Isis"), Some(true));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.set_entity("Seth", true).unwrap();

        store.remove_entity("Neith").unwrap();
        store.remove_entity("Seth").unwrap();

        let record = store.load();
        assert_eq!(record.get("Seth"), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_records_are_per_character() {
        let dir = tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.set_entity("Seth", true).unwrap();

        store.select_profile(Profile::new("Thoth", "alt"));
        assert_eq!(store.load().get("Seth"), None);
    }

    #[test]
    fn test_no_profile_degrades() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());

        assert!(!store.load().flag(ReservedFlag::Mute));
        assert!(matches!(
            store.set_entity("Seth", true),
            Err(AlarmError::NoProfile)
        ));
    }
}
