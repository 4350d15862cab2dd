//! Turns spawn notices into the names shown in the catalog.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::error::Result;
use super::model::{EntityName, SpawnEvent};

/// Substring marking titan uniques.
pub const TITAN_MARKER: &str = "(Titan)";
pub const TITAN_GROUP: &str = "(Titan Uniques)";
pub const JOB_GROUP: &str = "(Job Uniques)";

/// Uniques that spawn for the job system and are alarmed as one group.
pub const JOB_ROSTER: [&str; 6] = ["Selket", "Neith", "Isis", "Anubis", "Haroeris", "Seth"];

/// What the host knows about a monster id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub name: String,
}

/// Looks up monster names by id.
pub trait NameResolver {
    fn resolve(&self, entity_id: u32) -> Option<ResolvedEntity>;
}

/// Static id to name table, typically loaded from a JSON object
/// `{ "1954": "Isis", ... }`.
#[derive(Debug, Clone, Default)]
pub struct MonsterTable {
    names: HashMap<u32, String>,
}

impl MonsterTable {
    pub fn new(names: HashMap<u32, String>) -> Self {
        Self { names }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let names = serde_json::from_str(&content)?;
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameResolver for MonsterTable {
    fn resolve(&self, entity_id: u32) -> Option<ResolvedEntity> {
        self.names
            .get(&entity_id)
            .map(|name| ResolvedEntity { name: name.clone() })
    }
}

pub struct EventClassifier {
    resolver: Box<dyn NameResolver>,
}

impl EventClassifier {
    pub fn new(resolver: Box<dyn NameResolver>) -> Self {
        Self { resolver }
    }

    /// Canonical name for a relevant notice, `None` for everything else.
    pub fn classify(&self, event: &SpawnEvent) -> Option<EntityName> {
        if !event.update_type.is_relevant() {
            return None;
        }
        match self.resolver.resolve(event.entity_id) {
            Some(entity) if entity.name.trim().is_empty() => {
                log::warn!("Monster id {} has a blank name, skipping", event.entity_id);
                None
            }
            Some(entity) => Some(canonical_name(&entity.name)),
            None => {
                log::warn!("Unknown monster id {}, skipping", event.entity_id);
                None
            }
        }
    }
}

/// Apply the grouping rules to a resolved monster name.
pub fn canonical_name(resolved: &str) -> EntityName {
    let name = resolved.trim();
    if name.contains(TITAN_MARKER) {
        TITAN_GROUP.to_string()
    } else if JOB_ROSTER.contains(&name) {
        JOB_GROUP.to_string()
    } else {
        name.to_string()
    }
}
