use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AlarmError>;

/// Errors raised inside the alarm engine.
///
/// None of these reach the host: engine entry points log and degrade instead.
#[derive(Error, Debug)]
pub enum AlarmError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No character profile is loaded")]
    NoProfile,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}
