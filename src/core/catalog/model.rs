//! The two unique lists and the rules that move names between them.
//!
//! Invariants, after every public call:
//! - both lists are sorted and free of duplicates
//! - a name is in at most one list
//! - a name is in the alarm list iff the record holds `true` for it, and in
//!   the catalog iff the record holds `false`
//!
//! Persistence failures are logged and never undo a list change, so the lists
//! stay usable even when the record can't be written.

use super::bridge::{ListId, PresentationBridge};
use crate::core::error::Result;
use crate::core::model::EntityName;
use crate::core::record::model::{Record, ReservedFlag};
use crate::core::record::store::{ConfigStore, Profile};

/// A list of names kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedList {
    items: Vec<EntityName>,
}

impl SortedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item == name)
    }

    /// Append without sorting; follow with `ensure_sorted`.
    pub fn push(&mut self, name: &str) {
        self.items.push(name.to_string());
    }

    /// Remove `name`, returning the index it occupied.
    pub fn remove(&mut self, name: &str) -> Option<usize> {
        let index = self.position(name)?;
        self.items.remove(index);
        Some(index)
    }

    /// Sort if needed. Returns true when the list was already in order.
    pub fn ensure_sorted(&mut self) -> bool {
        if self.items.windows(2).all(|pair| pair[0] <= pair[1]) {
            return true;
        }
        self.items.sort();
        false
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[EntityName] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct CatalogModel<P: PresentationBridge> {
    store: ConfigStore,
    catalog: SortedList,
    alarms: SortedList,
    view: P,
}

impl<P: PresentationBridge> CatalogModel<P> {
    pub fn new(store: ConfigStore, view: P) -> Self {
        Self {
            store,
            catalog: SortedList::new(),
            alarms: SortedList::new(),
            view,
        }
    }

    /// Switch to `profile` and rebuild both lists from its record.
    pub fn load_profile(&mut self, profile: Profile) -> Record {
        self.store.select_profile(profile);
        let record = self.store.load();
        self.rebuild(&record);
        record
    }

    /// Replace both lists (and the display) with the contents of `record`.
    pub fn rebuild(&mut self, record: &Record) {
        for list in [ListId::Catalog, ListId::Alarms] {
            self.list_mut(list).clear();
            self.view.clear(list);
        }

        for (name, flagged) in record.entities() {
            let list = if flagged { ListId::Alarms } else { ListId::Catalog };
            self.list_mut(list).push(name);
            self.view.append(list, name);
        }
        // Record keys are ordered already; this only guards the invariant.
        for list in [ListId::Catalog, ListId::Alarms] {
            self.enforce_order(list);
        }

        for flag in ReservedFlag::all() {
            self.view.set_checked(*flag, record.flag(*flag));
        }
    }

    /// Add a newly seen unique to the possible uniques.
    pub fn admit_to_catalog(&mut self, name: &str) -> bool {
        self.admit(name, ListId::Catalog)
    }

    /// Add a unique straight to the alarm list.
    pub fn admit_to_alarm_list(&mut self, name: &str) -> bool {
        self.admit(name, ListId::Alarms)
    }

    /// Move `name` from the possible uniques to the alarm list.
    pub fn promote(&mut self, name: &str) -> bool {
        if !self.relocate(name, ListId::Catalog, ListId::Alarms) {
            return false;
        }
        log::info!("[{}] added to alarm list.", name);
        true
    }

    /// Move `name` from the alarm list back to the possible uniques.
    pub fn demote(&mut self, name: &str) -> bool {
        if !self.relocate(name, ListId::Alarms, ListId::Catalog) {
            return false;
        }
        log::info!("[{}] removed from alarm list.", name);
        true
    }

    /// Drop `name` from the alarm list and forget it in the record.
    pub fn manual_remove_from_alarm_list(&mut self, name: &str) -> bool {
        if is_reserved(name) || !self.take(ListId::Alarms, name) {
            log::debug!("[{}] is not in the alarm list", name);
            return false;
        }
        persist(self.store.remove_entity(name));
        log::info!("[{}] deleted successfully.", name);
        true
    }

    /// Re-sort `list` if needed, redrawing the display when it changed.
    pub fn enforce_order(&mut self, list: ListId) {
        if !self.list_mut(list).ensure_sorted() {
            self.redraw(list);
        }
    }

    pub fn catalog(&self) -> &[EntityName] {
        self.catalog.as_slice()
    }

    pub fn alarms(&self) -> &[EntityName] {
        self.alarms.as_slice()
    }

    pub fn is_alarmed(&self, name: &str) -> bool {
        self.alarms.contains(name)
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn view(&self) -> &P {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut P {
        &mut self.view
    }

    fn admit(&mut self, name: &str, target: ListId) -> bool {
        if is_reserved(name) {
            log::info!("[{}] is a reserved setting name and can't be used as a unique.", name);
            return false;
        }
        let in_catalog = self.catalog.contains(name);
        if in_catalog || self.alarms.contains(name) {
            if target == ListId::Alarms && in_catalog {
                log::info!(
                    "[{}] already exists in possible uniques, grab it from there.",
                    name
                );
            }
            return false;
        }

        match target {
            ListId::Catalog => {
                log::info!("[{}] was added to the list of possible uniques.", name)
            }
            ListId::Alarms => log::info!("[{}] was added to the alarm list.", name),
        }
        persist(self.store.set_entity(name, target == ListId::Alarms));
        self.insert(target, name);
        true
    }

    fn relocate(&mut self, name: &str, from: ListId, to: ListId) -> bool {
        if is_reserved(name) || !self.take(from, name) {
            log::debug!("[{}] is not in {}", name, from.label());
            return false;
        }
        self.insert(to, name);

        let flagged = to == ListId::Alarms;
        match self.store.toggle_entity(name) {
            Ok(Some(value)) if value == flagged => {}
            Ok(_) => {
                log::warn!("Record entry for [{}] was out of sync, rewriting it", name);
                persist(self.store.set_entity(name, flagged));
            }
            Err(e) => log::warn!("Could not save alarm record: {}", e),
        }
        true
    }

    fn insert(&mut self, list: ListId, name: &str) {
        self.list_mut(list).push(name);
        self.view.append(list, name);
        self.enforce_order(list);
    }

    fn take(&mut self, list: ListId, name: &str) -> bool {
        match self.list_mut(list).remove(name) {
            Some(index) => {
                self.view.remove_at(list, index);
                true
            }
            None => false,
        }
    }

    fn redraw(&mut self, list: ListId) {
        self.view.clear(list);
        let items = match list {
            ListId::Catalog => &self.catalog,
            ListId::Alarms => &self.alarms,
        };
        for name in items.as_slice() {
            self.view.append(list, name);
        }
    }

    fn list_mut(&mut self, list: ListId) -> &mut SortedList {
        match list {
            ListId::Catalog => &mut self.catalog,
            ListId::Alarms => &mut self.alarms,
        }
    }
}

fn is_reserved(name: &str) -> bool {
    ReservedFlag::from_key(name).is_some()
}

fn persist(result: Result<()>) {
    if let Err(e) = result {
        log::warn!("Could not save alarm record: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::bridge::ListView;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn setup(initial: Option<&str>) -> (TempDir, CatalogModel<ListView>) {
        let dir = tempdir().unwrap();
        let profile = Profile::new("Thoth", "suspekt");
        if let Some(content) = initial {
            fs::write(dir.path().join(profile.file_name()), content).unwrap();
        }
        let mut model = CatalogModel::new(ConfigStore::new(dir.path().to_path_buf()), ListView::new());
        model.load_profile(profile);
        (dir, model)
    }

    fn assert_invariants(model: &CatalogModel<ListView>) {
        for list in [model.catalog(), model.alarms()] {
            assert!(list.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", list);
        }
        for name in model.catalog() {
            assert!(!model.alarms().contains(name));
        }

        let record = model.store().load();
        for name in model.catalog() {
            assert_eq!(record.get(name), Some(false), "{}", name);
        }
        for name in model.alarms() {
            assert_eq!(record.get(name), Some(true), "{}", name);
        }
        for (name, flagged) in record.entities() {
            let list = if flagged { model.alarms() } else { model.catalog() };
            assert!(list.iter().any(|item| item == name), "{}", name);
        }

        assert_eq!(model.view().items(ListId::Catalog), model.catalog());
        assert_eq!(model.view().items(ListId::Alarms), model.alarms());
    }

    #[test]
    fn test_ensure_sorted_is_idempotent() {
        let mut list = SortedList::new();
        for name in ["Seth", "Anubis", "Isis"] {
            list.push(name);
        }
        assert!(!list.ensure_sorted());
        let once = list.clone();
        assert!(list.ensure_sorted());
        assert_eq!(list, once);
        assert_eq!(list.as_slice(), ["Anubis", "Isis", "Seth"]);
    }

    #[test]
    fn test_load_splits_record() {
        let (_dir, model) = setup(Some(r#"{"__mute__": false, "Seth": true, "Anubis": false}"#));

        assert_eq!(model.alarms(), ["Seth"]);
        assert_eq!(model.catalog(), ["Anubis"]);
        assert!(!model.view().is_checked(ReservedFlag::Mute));
        assert_invariants(&model);
    }

    #[test]
    fn test_admit_keeps_order() {
        let (_dir, mut model) = setup(None);
        assert!(model.admit_to_catalog("Neith"));
        assert!(model.admit_to_catalog("Anubis"));
        assert!(model.admit_to_catalog("Selket"));

        assert_eq!(model.catalog(), ["Anubis", "Neith", "Selket"]);
        assert_invariants(&model);
    }

    #[test]
    fn test_admit_rejects_duplicates() {
        let (_dir, mut model) = setup(Some(r#"{"Seth": true, "Anubis": true}"#));

        assert!(!model.admit_to_catalog("Anubis"));
        assert!(model.catalog().is_empty());
        assert_eq!(model.alarms(), ["Anubis", "Seth"]);

        assert!(model.admit_to_catalog("Isis"));
        assert!(!model.admit_to_alarm_list("Isis"));
        assert!(!model.admit_to_catalog("Isis"));
        assert_eq!(model.catalog(), ["Isis"]);
        assert_invariants(&model);
    }

    #[test]
    fn test_promote_and_demote() {
        let (_dir, mut model) = setup(Some(r#"{"Seth": false, "Anubis": false, "Isis": true}"#));

        assert!(model.promote("Seth"));
        assert_eq!(model.alarms(), ["Isis", "Seth"]);
        assert_eq!(model.catalog(), ["Anubis"]);
        assert_invariants(&model);

        assert!(model.demote("Isis"));
        assert_eq!(model.alarms(), ["Seth"]);
        assert_eq!(model.catalog(), ["Anubis", "Isis"]);
        assert_invariants(&model);
    }

    #[test]
    fn test_moves_require_membership() {
        let (_dir, mut model) = setup(Some(r#"{"Seth": true}"#));

        assert!(!model.promote("Seth"));
        assert!(!model.demote("Neith"));
        assert_eq!(model.alarms(), ["Seth"]);
        assert_invariants(&model);
    }

    #[test]
    fn test_promote_repairs_missing_record_entry() {
        let (_dir, mut model) = setup(None);
        assert!(model.admit_to_catalog("Neith"));
        model.store().remove_entity("Neith").unwrap();

        assert!(model.promote("Neith"));
        assert_eq!(model.store().load().get("Neith"), Some(true));
        assert_invariants(&model);
    }

    #[test]
    fn test_manual_remove_forgets_entity() {
        let (_dir, mut model) = setup(Some(r#"{"Seth": true, "Anubis": false}"#));

        assert!(model.manual_remove_from_alarm_list("Seth"));
        assert!(model.alarms().is_empty());
        assert_eq!(model.catalog(), ["Anubis"]);

        let path = model.store().record_path().unwrap();
        let saved = fs::read_to_string(path).unwrap();
        assert!(!saved.contains("Seth"));
        assert_invariants(&model);

        assert!(!model.manual_remove_from_alarm_list("Seth"));
    }

    #[test]
    fn test_demote_keeps_entity() {
        let (_dir, mut model) = setup(Some(r#"{"Seth": true}"#));

        assert!(model.demote("Seth"));
        assert_eq!(model.catalog(), ["Seth"]);
        assert_eq!(model.store().load().get("Seth"), Some(false));
        assert_invariants(&model);
    }

    #[test]
    fn test_reload_replaces_lists() {
        let (dir, mut model) = setup(Some(r#"{"Seth": true}"#));
        let other = Profile::new("Thoth", "alt");
        fs::write(dir.path().join(other.file_name()), r#"{"__mute__": true, "Neith": false}"#).unwrap();

        let record = model.load_profile(other);
        assert!(record.flag(ReservedFlag::Mute));
        assert!(model.alarms().is_empty());
        assert_eq!(model.catalog(), ["Neith"]);
        assert!(model.view().is_checked(ReservedFlag::Mute));
        assert_invariants(&model);
    }

    #[test]
    fn test_reserved_names_are_not_uniques() {
        let (_dir, mut model) = setup(None);

        assert!(!model.admit_to_alarm_list("__mute__"));
        assert!(!model.admit_to_catalog("__mute__"));
        assert!(!model.promote("__mute__"));
        assert!(!model.demote("__mute__"));
        assert!(!model.manual_remove_from_alarm_list("__mute__"));

        assert!(model.alarms().is_empty());
        assert!(model.catalog().is_empty());
        let record = model.store().load();
        assert!(!record.flag(ReservedFlag::Mute));
        assert_eq!(record.entities().count(), 0);

        let reloaded = model.load_profile(Profile::new("Thoth", "suspekt"));
        assert!(!reloaded.flag(ReservedFlag::Mute));
        assert!(model.alarms().is_empty());
        assert_invariants(&model);
    }

    #[test]
    fn test_lists_survive_missing_profile() {
        let dir = tempdir().unwrap();
        let mut model = CatalogModel::new(ConfigStore::new(dir.path().to_path_buf()), ListView::new());

        assert!(model.admit_to_catalog("Anubis"));
        assert!(model.promote("Anubis"));
        assert_eq!(model.alarms(), ["Anubis"]);
    }
}
