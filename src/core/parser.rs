//! JSON-lines event feed consumed by the headless host.
//!
//! One object per line, tagged by `type`:
//!
//! ```text
//! {"type": "character", "server": "Thoth", "name": "suspekt"}
//! {"type": "spawn", "update_type": 5, "entity_id": 1954}
//! {"type": "packet", "opcode": 12300, "data": [5, 0, 162, 7, 0, 0]}
//! {"type": "promote", "name": "Lord Yarkan"}
//! {"type": "mute", "muted": true}
//! ```

use serde::Deserialize;

use super::model::{SpawnEvent, UpdateType, UserAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    CharacterLoaded { server: String, character: String },
    Spawn(SpawnEvent),
    Action(UserAction),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FeedLine {
    Character { server: String, name: String },
    Spawn { update_type: u8, entity_id: u32 },
    Packet { opcode: u16, data: Vec<u8> },
    Promote { name: String },
    Demote { name: String },
    AddAlarm { name: String },
    DeleteAlarm { name: String },
    Mute { muted: bool },
}

/// Parse one feed line.
///
/// Blank lines, `#` comments, malformed JSON and packets that are not unique
/// notices all yield `None`.
pub fn parse_line(line: &str) -> Option<FeedEvent> {
    let trimmed = line.trim().trim_start_matches('\u{feff}');
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let parsed: FeedLine = match serde_json::from_str(trimmed) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Skipping feed line {:?}: {}", trimmed, e);
            return None;
        }
    };

    let event = match parsed {
        FeedLine::Character { server, name } => FeedEvent::CharacterLoaded {
            server,
            character: name,
        },
        FeedLine::Spawn {
            update_type,
            entity_id,
        } => FeedEvent::Spawn(SpawnEvent::new(UpdateType::from_byte(update_type), entity_id)),
        FeedLine::Packet { opcode, data } => FeedEvent::Spawn(SpawnEvent::decode(opcode, &data)?),
        FeedLine::Promote { name } => FeedEvent::Action(UserAction::Promote(name)),
        FeedLine::Demote { name } => FeedEvent::Action(UserAction::Demote(name)),
        FeedLine::AddAlarm { name } => FeedEvent::Action(UserAction::AddToAlarmList(name)),
        FeedLine::DeleteAlarm { name } => FeedEvent::Action(UserAction::DeleteFromAlarmList(name)),
        FeedLine::Mute { muted } => FeedEvent::Action(UserAction::SetMute(muted)),
    };
    Some(event)
}
