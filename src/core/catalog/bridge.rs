//! Contract between the catalog and whatever renders it.
//!
//! The display never owns state of its own: it is rebuilt from the catalog on
//! every profile load and patched after each mutation.

use std::collections::HashMap;

use crate::core::record::model::ReservedFlag;

/// The two lists shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListId {
    /// "Possible Uniques"
    Catalog,
    /// "Unique Alarm List"
    Alarms,
}

impl ListId {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Catalog => "Possible Uniques",
            Self::Alarms => "Unique Alarm List",
        }
    }
}

pub trait PresentationBridge {
    fn append(&mut self, list: ListId, name: &str);
    fn remove_at(&mut self, list: ListId, index: usize) -> Option<String>;
    fn clear(&mut self, list: ListId);
    fn items(&self, list: ListId) -> Vec<String>;
    fn current_selection(&self, list: ListId) -> Option<String>;
    fn set_checked(&mut self, flag: ReservedFlag, checked: bool);
}

/// In-memory list display, used headless and in tests.
#[derive(Debug, Default)]
pub struct ListView {
    lists: HashMap<ListId, Vec<String>>,
    selections: HashMap<ListId, usize>,
    checked: HashMap<ReservedFlag, bool>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the row showing `name`. Returns false when it is not shown.
    pub fn select(&mut self, list: ListId, name: &str) -> bool {
        let index = self
            .lists
            .get(&list)
            .and_then(|items| items.iter().position(|item| item == name));
        match index {
            Some(index) => {
                self.selections.insert(list, index);
                true
            }
            None => false,
        }
    }

    pub fn is_checked(&self, flag: ReservedFlag) -> bool {
        self.checked.get(&flag).copied().unwrap_or(false)
    }
}

impl PresentationBridge for ListView {
    fn append(&mut self, list: ListId, name: &str) {
        log::debug!("{} += {}", list.label(), name);
        self.lists.entry(list).or_default().push(name.to_string());
    }

    fn remove_at(&mut self, list: ListId, index: usize) -> Option<String> {
        let items = self.lists.get_mut(&list)?;
        if index >= items.len() {
            return None;
        }
        self.selections.remove(&list);
        let removed = items.remove(index);
        log::debug!("{} -= {}", list.label(), removed);
        Some(removed)
    }

    fn clear(&mut self, list: ListId) {
        self.lists.remove(&list);
        self.selections.remove(&list);
    }

    fn items(&self, list: ListId) -> Vec<String> {
        self.lists.get(&list).cloned().unwrap_or_default()
    }

    fn current_selection(&self, list: ListId) -> Option<String> {
        let index = *self.selections.get(&list)?;
        self.lists.get(&list)?.get(index).cloned()
    }

    fn set_checked(&mut self, flag: ReservedFlag, checked: bool) {
        self.checked.insert(flag, checked);
    }
}
