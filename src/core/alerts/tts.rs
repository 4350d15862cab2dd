use reqwest::blocking::Client;

use crate::core::config::Settings;
use crate::core::error::{AlarmError, Result};

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";
const USER_AGENT: &str = "Mozilla/5.0";

/// Turns text into encoded audio.
pub trait Synthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Google Translate speech endpoint, mp3 output.
///
/// Uses a blocking client: build and call it off any async executor.
pub struct GoogleTts {
    client: Client,
    language: String,
    slow: bool,
}

impl GoogleTts {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.synthesis_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            language: settings.language.clone(),
            slow: settings.slow_speech,
        })
    }

    fn speed(&self) -> &'static str {
        if self.slow {
            "0.24"
        } else {
            "1"
        }
    }
}

impl Synthesizer for GoogleTts {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AlarmError::Synthesis("nothing to say".to_string()));
        }

        let response = self
            .client
            .get(TTS_ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.language.as_str()),
                ("ttsspeed", self.speed()),
                ("q", text),
            ])
            .send()?
            .error_for_status()?;

        let audio = response.bytes()?;
        if audio.is_empty() {
            return Err(AlarmError::Synthesis(format!("empty audio for [{}]", text)));
        }
        Ok(audio.to_vec())
    }
}
