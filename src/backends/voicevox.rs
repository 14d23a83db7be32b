use super::{SpeechBackend, Speaker, Timeouts, Tuning};
use crate::error::{Result, VoicegenError};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::debug;

const SPEED_SCALE: &str = "speedScale";
const PITCH_SCALE: &str = "pitchScale";
const INTONATION_SCALE: &str = "intonationScale";

/// The structured description returned by `/audio_query`.
///
/// Kept as a raw JSON object: only the three scale fields are ever touched,
/// everything else goes back to `/synthesis` exactly as the engine sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AudioQuery(Map<String, Value>);

impl AudioQuery {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(VoicegenError::MalformedQuery(other.to_string())),
        }
    }

    /// Overwrites the supplied scale fields in place.
    pub fn apply(&mut self, tuning: &Tuning) {
        let fields = [
            (SPEED_SCALE, tuning.speed),
            (PITCH_SCALE, tuning.pitch),
            (INTONATION_SCALE, tuning.intonation),
        ];
        for (key, value) in fields {
            if let Some(v) = value {
                self.0.insert(key.to_string(), Value::from(v));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn speed_scale(&self) -> Option<f64> {
        self.0.get(SPEED_SCALE).and_then(Value::as_f64)
    }

    pub fn pitch_scale(&self) -> Option<f64> {
        self.0.get(PITCH_SCALE).and_then(Value::as_f64)
    }

    pub fn intonation_scale(&self) -> Option<f64> {
        self.0.get(INTONATION_SCALE).and_then(Value::as_f64)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Blocking client for a VOICEVOX engine.
pub struct VoicevoxClient {
    http: Client,
    base_url: String,
    speaker: u32,
    timeouts: Timeouts,
}

impl VoicevoxClient {
    pub fn new(base_url: impl Into<String>, speaker: u32, timeouts: Timeouts) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeouts.health)
            .build()
            .map_err(VoicegenError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            speaker,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn speaker(&self) -> u32 {
        self.speaker
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Sends the request and turns non-2xx statuses into errors.
    fn send(&self, url: &str, request: RequestBuilder) -> Result<Response> {
        let started = Instant::now();
        let response = request.send().map_err(|source| VoicegenError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(%url, %status, elapsed_ms = started.elapsed().as_millis() as u64, "voicevox response");
        if !status.is_success() {
            return Err(VoicegenError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    fn read_body(url: &str, response: Response) -> Result<Vec<u8>> {
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|source| VoicegenError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// Health check: the engine answers `GET /speakers` with a 2xx.
    pub fn check_speakers(&self) -> Result<()> {
        let url = self.endpoint("speakers");
        self.send(&url, self.http.get(&url).timeout(self.timeouts.health))?;
        Ok(())
    }

    pub fn speakers(&self) -> Result<Vec<Speaker>> {
        let url = self.endpoint("speakers");
        let response = self.send(&url, self.http.get(&url).timeout(self.timeouts.health))?;
        let body = Self::read_body(&url, response)?;
        serde_json::from_slice(&body).map_err(|source| VoicegenError::Decode { url, source })
    }

    /// Engine version, with the JSON string quotes stripped when present.
    pub fn version(&self) -> Result<String> {
        let url = self.endpoint("version");
        let response = self.send(&url, self.http.get(&url).timeout(self.timeouts.health))?;
        let body = Self::read_body(&url, response)?;
        let raw = String::from_utf8_lossy(&body).trim().to_string();
        Ok(serde_json::from_str::<String>(&raw).unwrap_or(raw))
    }

    pub fn audio_query(&self, text: &str) -> Result<AudioQuery> {
        let url = self.endpoint("audio_query");
        let speaker = self.speaker.to_string();
        let request = self
            .http
            .post(&url)
            .query(&[("text", text), ("speaker", speaker.as_str())])
            .timeout(self.timeouts.query);

        let response = self.send(&url, request)?;
        let body = Self::read_body(&url, response)?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|source| VoicegenError::Decode { url, source })?;
        AudioQuery::from_value(value)
    }

    pub fn synthesis(&self, query: &AudioQuery) -> Result<Vec<u8>> {
        let url = self.endpoint("synthesis");
        let speaker = self.speaker.to_string();
        let request = self
            .http
            .post(&url)
            .query(&[("speaker", speaker.as_str())])
            .json(query)
            .timeout(self.timeouts.synthesis);

        let response = self.send(&url, request)?;
        Self::read_body(&url, response)
    }
}

impl SpeechBackend for VoicevoxClient {
    fn id(&self) -> &'static str {
        "voicevox"
    }

    fn synthesize(&self, text: &str, tuning: &Tuning) -> Result<Vec<u8>> {
        let mut query = self.audio_query(text)?;
        if !tuning.is_empty() {
            query.apply(tuning);
        }
        self.synthesis(&query)
    }
}
