//! Persisted alarm record for one character.
//!
//! A record maps unique names to "is in alarm list" and also carries a few
//! reserved feature flags. Reserved flags always serialize first, in
//! declaration order, followed by every unique sorted by name.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Feature flags stored next to the uniques.
///
/// Variant order is the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReservedFlag {
    Mute,
}

impl ReservedFlag {
    pub fn all() -> &'static [ReservedFlag] {
        &[Self::Mute]
    }

    /// Key used in the record file
    pub fn key(&self) -> &'static str {
        match self {
            Self::Mute => "__mute__",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|flag| flag.key() == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, bool>")]
pub struct Record {
    flags: BTreeMap<ReservedFlag, bool>,
    entities: BTreeMap<String, bool>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, reserved flag or unique.
    pub fn get(&self, key: &str) -> Option<bool> {
        match ReservedFlag::from_key(key) {
            Some(flag) => self.flags.get(&flag).copied(),
            None => self.entities.get(key).copied(),
        }
    }

    pub fn set(&mut self, key: &str, value: bool) {
        match ReservedFlag::from_key(key) {
            Some(flag) => {
                self.flags.insert(flag, value);
            }
            None => {
                self.entities.insert(key.to_string(), value);
            }
        }
    }

    /// Delete `key`. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match ReservedFlag::from_key(key) {
            Some(flag) => self.flags.remove(&flag).is_some(),
            None => self.entities.remove(key).is_some(),
        }
    }

    /// Invert `key` in place. Absent keys stay absent and yield `None`.
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let slot = match ReservedFlag::from_key(key) {
            Some(flag) => self.flags.get_mut(&flag)?,
            None => self.entities.get_mut(key)?,
        };
        *slot = !*slot;
        Some(*slot)
    }

    pub fn flag(&self, flag: ReservedFlag) -> bool {
        self.flags.get(&flag).copied().unwrap_or(false)
    }

    /// Insert every missing reserved flag as `false`.
    ///
    /// Returns the flags that were added.
    pub fn fill_default_flags(&mut self) -> Vec<ReservedFlag> {
        let mut added = Vec::new();
        for flag in ReservedFlag::all() {
            if !self.flags.contains_key(flag) {
                self.flags.insert(*flag, false);
                added.push(*flag);
            }
        }
        added
    }

    /// Uniques in name order with their alarm status.
    pub fn entities(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entities.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.flags.len() + self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<BTreeMap<String, bool>> for Record {
    fn from(entries: BTreeMap<String, bool>) -> Self {
        let mut record = Record::new();
        for (key, value) in entries {
            record.set(&key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (flag, value) in &self.flags {
            map.serialize_entry(flag.key(), value)?;
        }
        for (name, value) in &self.entities {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
