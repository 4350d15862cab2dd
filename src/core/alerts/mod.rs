// Audible alarms for uniques on the alarm list.
//
// Architecture:
// - cache.rs: synthesized clips on disk, one per unique
// - tts.rs: text-to-speech providers
// - playback.rs: audio output and fire-and-forget dispatch
// - scheduler.rs: per-unique cooldown, synthesize-or-reuse, dispatch

pub mod cache;
pub mod playback;
pub mod scheduler;
pub mod tts;
