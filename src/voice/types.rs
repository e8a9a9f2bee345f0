// voice/types.rs - Speech types and errors

use serde::Serialize;
use thiserror::Error;

/// A voice offered by the host synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Identifier passed back to the synthesizer (e.g. "Samantha", "en-us")
    pub id: String,
    /// BCP-47 style language tag (e.g. "en-US")
    pub lang: String,
}

/// Per-utterance synthesis parameters
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    pub voice_id: Option<String>,
    pub lang: String,
    /// 1.0 is the synthesizer's normal speed
    pub rate: f32,
    pub pitch: f32,
    /// 0.0 - 1.0
    pub volume: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice_id: None,
            lang: "en-US".to_string(),
            rate: 0.8,
            pitch: 1.3,
            volume: 0.9,
        }
    }
}

impl VoiceParams {
    pub fn with_voice(voice_id: Option<String>) -> Self {
        Self {
            voice_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub params: VoiceParams,
}

/// What to do with a sequence that is already playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Cancel whatever is playing and start over
    Restart,
    /// Queue behind whatever is playing
    Layer,
}

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Speech backend unavailable: {0}")]
    Unavailable(String),

    #[error("Speech command failed: {0}")]
    CommandFailed(String),
}
