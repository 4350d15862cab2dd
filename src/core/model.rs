pub type EntityName = String;

/// Server opcode carrying unique monster notices.
pub const UNIQUE_NOTICE_OPCODE: u16 = 0x300C;

/// Kind of a unique monster notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    Spawned,
    Killed,
    Other(u8),
}

impl UpdateType {
    pub fn from_byte(value: u8) -> Self {
        match value {
            5 => Self::Spawned,
            6 => Self::Killed,
            other => Self::Other(other),
        }
    }

    /// Whether the entity should be admitted to the catalog.
    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Spawned | Self::Killed)
    }

    /// Whether the notice may trigger an audible alarm.
    pub fn triggers_alarm(&self) -> bool {
        matches!(self, Self::Spawned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnEvent {
    pub update_type: UpdateType,
    pub entity_id: u32,
}

impl SpawnEvent {
    pub fn new(update_type: UpdateType, entity_id: u32) -> Self {
        Self {
            update_type,
            entity_id,
        }
    }

    /// Decode a raw unique notice packet.
    ///
    /// Layout: `[update_type: u8][_: u8][entity_id: u32 LE]...`. The entity id
    /// is only present for spawn/kill notices, so other update types decode to
    /// `None` as well.
    pub fn decode(opcode: u16, payload: &[u8]) -> Option<Self> {
        if opcode != UNIQUE_NOTICE_OPCODE {
            return None;
        }
        let update_type = UpdateType::from_byte(*payload.first()?);
        if !update_type.is_relevant() {
            return None;
        }
        let id_bytes: [u8; 4] = payload.get(2..6)?.try_into().ok()?;
        Some(Self::new(update_type, u32::from_le_bytes(id_bytes)))
    }
}

/// Something the user did in the presentation layer.
///
/// Every action names its target explicitly instead of relying on a widget
/// selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Move from possible uniques to the alarm list
    Promote(EntityName),
    /// Move from the alarm list back to possible uniques
    Demote(EntityName),
    /// Free text typed into the manual add box
    AddToAlarmList(String),
    /// Forget a unique entirely
    DeleteFromAlarmList(EntityName),
    SetMute(bool),
}
