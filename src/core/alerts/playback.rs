//! Fire-and-forget audio playback.
//!
//! A dispatched clip is never joined, cancelled or throttled. Several alarms
//! may play over each other.

use std::sync::Arc;
use std::thread;

use tokio::runtime::Handle;

use crate::core::error::Result;

/// Plays encoded audio, blocking until it finishes.
pub trait Player: Send + Sync {
    fn play(&self, audio: Vec<u8>) -> Result<()>;
}

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs somewhere other than the caller's thread.
pub trait Dispatcher {
    fn submit(&self, job: Job);
}

/// One OS thread per job.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDispatcher;

impl Dispatcher for ThreadDispatcher {
    fn submit(&self, job: Job) {
        let spawned = thread::Builder::new()
            .name("alarm-playback".to_string())
            .spawn(job);
        if let Err(e) = spawned {
            log::warn!("Could not start playback thread: {}", e);
        }
    }
}

/// Jobs go to a tokio runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioDispatcher {
    handle: Handle,
}

impl TokioDispatcher {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Dispatcher for TokioDispatcher {
    fn submit(&self, job: Job) {
        drop(self.handle.spawn_blocking(job));
    }
}

/// Plays through the default output device.
#[cfg(feature = "audio")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioPlayer;

#[cfg(feature = "audio")]
impl Player for RodioPlayer {
    fn play(&self, audio: Vec<u8>) -> Result<()> {
        use crate::core::error::AlarmError;
        use std::io::Cursor;

        let stream = rodio::OutputStreamBuilder::open_default_stream()
            .map_err(|e| AlarmError::Playback(e.to_string()))?;
        let sink = rodio::Sink::connect_new(stream.mixer());
        let source = rodio::Decoder::new(Cursor::new(audio))
            .map_err(|e| AlarmError::Playback(e.to_string()))?;
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

/// Stand-in when built without an audio backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl Player for SilentPlayer {
    fn play(&self, audio: Vec<u8>) -> Result<()> {
        log::info!("(silent) alarm clip of {} bytes", audio.len());
        Ok(())
    }
}

pub fn default_player() -> Arc<dyn Player> {
    #[cfg(feature = "audio")]
    {
        Arc::new(RodioPlayer)
    }
    #[cfg(not(feature = "audio"))]
    {
        Arc::new(SilentPlayer)
    }
}
