pub mod voicevox;

pub use voicevox::{AudioQuery, VoicevoxClient};

use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;

/// Per-call budgets. Rendering is the slow step, the health check the fast one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub health: Duration,
    pub query: Duration,
    pub synthesis: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(10),
            query: Duration::from_secs(30),
            synthesis: Duration::from_secs(60),
        }
    }
}

/// Prosody multipliers written into an audio query before rendering.
/// `None` leaves the engine's own value in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tuning {
    pub speed: Option<f64>,
    pub pitch: Option<f64>,
    pub intonation: Option<f64>,
}

impl Tuning {
    pub const NONE: Tuning = Tuning {
        speed: None,
        pitch: None,
        intonation: None,
    };

    pub fn new(speed: f64, pitch: f64, intonation: f64) -> Self {
        Self {
            speed: Some(speed),
            pitch: Some(pitch),
            intonation: Some(intonation),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_none() && self.pitch.is_none() && self.intonation.is_none()
    }
}

/// A voice profile as reported by `GET /speakers`.
#[derive(Debug, Clone, Deserialize)]
pub struct Speaker {
    pub name: String,
    #[serde(default)]
    pub speaker_uuid: String,
    #[serde(default)]
    pub styles: Vec<SpeakerStyle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeakerStyle {
    pub name: String,
    pub id: u32,
}

/// Anything that can turn a line of text into audio bytes.
/// The batch runner only talks to this trait.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechBackend: Send + Sync {
    /// Returns the rendered audio (WAV for VOICEVOX)
    fn synthesize(&self, text: &str, tuning: &Tuning) -> Result<Vec<u8>>;

    /// Returns the unique ID of the backend (e.g., "voicevox")
    fn id(&self) -> &'static str;
}
