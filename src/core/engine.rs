//! The alarm engine: one owner for the catalog, the mute flag and the
//! alert scheduler.
//!
//! All entry points run on the caller's thread and never fail; problems are
//! logged and the engine keeps going.

use super::alerts::scheduler::{AlertOutcome, AlertScheduler};
use super::catalog::bridge::PresentationBridge;
use super::catalog::model::CatalogModel;
use super::classifier::EventClassifier;
use super::model::{EntityName, SpawnEvent, UserAction};
use super::record::model::ReservedFlag;
use super::record::store::Profile;

/// What happened to a single spawn notice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpawnReport {
    /// Canonical name, if the notice was relevant and resolvable
    pub name: Option<EntityName>,
    /// Whether the name was new to both lists
    pub admitted: bool,
    pub alert: Option<AlertOutcome>,
}

pub struct Engine<P: PresentationBridge> {
    catalog: CatalogModel<P>,
    classifier: EventClassifier,
    scheduler: AlertScheduler,
    muted: bool,
}

impl<P: PresentationBridge> Engine<P> {
    pub fn new(
        catalog: CatalogModel<P>,
        classifier: EventClassifier,
        scheduler: AlertScheduler,
    ) -> Self {
        Self {
            catalog,
            classifier,
            scheduler,
            muted: false,
        }
    }

    /// Load the record of the character that just joined.
    pub fn on_character_loaded(&mut self, server: &str, character: &str) {
        let record = self.catalog.load_profile(Profile::new(server, character));
        self.muted = record.flag(ReservedFlag::Mute);
        log::info!(
            "Loaded [{}] {}: {} possible uniques, {} alarms{}",
            server,
            character,
            self.catalog.catalog().len(),
            self.catalog.alarms().len(),
            if self.muted { " (muted)" } else { "" }
        );
    }

    pub fn on_spawn_event(&mut self, event: &SpawnEvent) -> SpawnReport {
        let name = match self.classifier.classify(event) {
            Some(name) => name,
            None => return SpawnReport::default(),
        };

        let admitted = self.catalog.admit_to_catalog(&name);

        let alert = if event.update_type.triggers_alarm()
            && self.catalog.is_alarmed(&name)
            && !self.muted
        {
            Some(self.scheduler.notify(&name))
        } else {
            None
        };

        SpawnReport {
            name: Some(name),
            admitted,
            alert,
        }
    }

    pub fn on_user_action(&mut self, action: UserAction) {
        match action {
            UserAction::Promote(name) => {
                self.catalog.promote(&name);
            }
            UserAction::Demote(name) => {
                self.catalog.demote(&name);
            }
            UserAction::AddToAlarmList(text) => {
                let name = text.trim();
                if name.is_empty() {
                    log::info!("Type a unique name to add it to the alarm list.");
                } else {
                    self.catalog.admit_to_alarm_list(name);
                }
            }
            UserAction::DeleteFromAlarmList(name) => {
                if name.trim().is_empty() {
                    log::info!("You can only delete uniques from the alarm list.");
                } else {
                    self.catalog.manual_remove_from_alarm_list(&name);
                }
            }
            UserAction::SetMute(muted) => self.set_muted(muted),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn catalog(&self) -> &CatalogModel<P> {
        &self.catalog
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.catalog.view_mut().set_checked(ReservedFlag::Mute, muted);
        if let Err(e) = self.catalog.store().set_flag(ReservedFlag::Mute, muted) {
            log::warn!("Could not save mute flag: {}", e);
        }
        log::info!("{}", if muted { "Alarms muted." } else { "Alarms unmuted." });
    }
}
