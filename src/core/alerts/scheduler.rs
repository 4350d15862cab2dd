// Per-unique cooldown gate in front of speech synthesis and playback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::cache::AssetCache;
use super::playback::{Dispatcher, Player};
use super::tts::Synthesizer;
use crate::core::model::EntityName;

/// What a `notify` call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Same unique alarmed too recently
    CoolingDown,
    /// Cached clip handed to playback
    PlayedCached,
    /// Clip synthesized, cached and handed to playback
    Synthesized,
    /// Synthesis failed; nothing played and no cooldown started
    Failed,
}

impl AlertOutcome {
    pub fn dispatched(&self) -> bool {
        matches!(self, Self::PlayedCached | Self::Synthesized)
    }
}

enum Clip {
    Cached,
    Fresh(Vec<u8>),
}

pub struct AlertScheduler {
    cooldown: Duration,
    cache: AssetCache,
    synthesizer: Box<dyn Synthesizer>,
    player: Arc<dyn Player>,
    dispatcher: Box<dyn Dispatcher>,
    /// Last successful dispatch per unique, for this process only
    last_dispatch: HashMap<EntityName, Instant>,
}

impl AlertScheduler {
    pub fn new(
        cooldown: Duration,
        cache: AssetCache,
        synthesizer: Box<dyn Synthesizer>,
        player: Arc<dyn Player>,
        dispatcher: Box<dyn Dispatcher>,
    ) -> Self {
        Self {
            cooldown,
            cache,
            synthesizer,
            player,
            dispatcher,
            last_dispatch: HashMap::new(),
        }
    }

    pub fn notify(&mut self, name: &str) -> AlertOutcome {
        self.notify_at(name, Instant::now())
    }

    /// Sound the alarm for `name` unless it is cooling down at `now`.
    ///
    /// A missing clip is synthesized on the calling thread first. Playback
    /// itself is handed to the dispatcher and never awaited.
    pub fn notify_at(&mut self, name: &str, now: Instant) -> AlertOutcome {
        if let Some(last) = self.last_dispatch.get(name) {
            if now.saturating_duration_since(*last) < self.cooldown {
                return AlertOutcome::CoolingDown;
            }
        }

        let (clip, outcome) = if self.cache.contains(name) {
            (Clip::Cached, AlertOutcome::PlayedCached)
        } else {
            match self.create_clip(name) {
                Some(audio) => (Clip::Fresh(audio), AlertOutcome::Synthesized),
                None => return AlertOutcome::Failed,
            }
        };

        self.dispatch(name, clip);
        self.last_dispatch.insert(name.to_string(), now);
        outcome
    }

    pub fn last_dispatch(&self, name: &str) -> Option<Instant> {
        self.last_dispatch.get(name).copied()
    }

    fn create_clip(&self, name: &str) -> Option<Vec<u8>> {
        let audio = match self.synthesizer.synthesize(name) {
            Ok(audio) => audio,
            Err(e) => {
                log::warn!("Could not create alarm for [{}]: {}", name, e);
                return None;
            }
        };
        match self.cache.store(name, &audio) {
            Ok(_) => log::info!("Alarm file for [{}] created.", name),
            Err(e) => log::warn!("Could not cache alarm for [{}]: {}", name, e),
        }
        Some(audio)
    }

    fn dispatch(&self, name: &str, clip: Clip) {
        let player = Arc::clone(&self.player);
        let cache = self.cache.clone();
        let name = name.to_string();
        self.dispatcher.submit(Box::new(move || {
            let result = match clip {
                Clip::Cached => cache.read(&name).and_then(|audio| player.play(audio)),
                Clip::Fresh(audio) => player.play(audio),
            };
            if let Err(e) = result {
                log::warn!("Alarm for [{}] could not be played: {}", name, e);
            }
        }));
    }
}
