use crate::backends::{SpeechBackend, Tuning};
use crate::error::VoicegenError;
use crate::manifest::Manifest;
use std::io::Cursor;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// One line to render: where it goes, what it says, how it is tuned.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRequest {
    pub file_name: String,
    pub category: Option<String>,
    pub text: String,
    pub tuning: Tuning,
}

impl VoiceRequest {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            category: None,
            text: text.into(),
            tuning: Tuning::NONE,
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub out_dir: PathBuf,
    /// Continue past failed lines and report them at the end.
    pub keep_going: bool,
    pub pause: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: usize,
    pub duration: Option<Duration>,
}

#[derive(Error, Debug)]
#[error("failed to generate {file_name}: {source}")]
pub struct ItemFailure {
    pub file_name: String,
    #[source]
    pub source: VoicegenError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub generated: Vec<GeneratedFile>,
    pub failures: Vec<ItemFailure>,
    pub manifest: Manifest,
}

impl BatchSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Playback length when `audio` is a WAV file we can read.
pub fn wav_duration(audio: &[u8]) -> Option<Duration> {
    let reader = hound::WavReader::new(Cursor::new(audio)).ok()?;
    let rate = reader.spec().sample_rate;
    if rate == 0 {
        return None;
    }
    Some(Duration::from_secs_f64(reader.duration() as f64 / rate as f64))
}

pub struct BatchRunner<'a> {
    backend: &'a dyn SpeechBackend,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(backend: &'a dyn SpeechBackend, options: BatchOptions) -> Self {
        Self { backend, options }
    }

    /// Renders every request in order, one at a time.
    ///
    /// Without `keep_going` the first failure is returned and nothing after it
    /// is attempted; files written before it stay on disk.
    pub fn run(&self, requests: &[VoiceRequest]) -> Result<BatchSummary, ItemFailure> {
        let mut summary = BatchSummary::default();

        for (idx, request) in requests.iter().enumerate() {
            if idx > 0 && !self.options.pause.is_zero() {
                thread::sleep(self.options.pause);
            }
            if let Some(category) = &request.category {
                summary.manifest.touch(category);
            }

            match self.generate(request) {
                Ok(file) => {
                    match file.duration {
                        Some(d) => println!(
                            "Generated: {} ({} bytes, {:.2}s)  text={}",
                            file.path.display(),
                            file.bytes,
                            d.as_secs_f64(),
                            request.text
                        ),
                        None => println!(
                            "Generated: {} ({} bytes)  text={}",
                            file.path.display(),
                            file.bytes,
                            request.text
                        ),
                    }
                    if let Some(category) = &request.category {
                        summary.manifest.record(category, &file.file_name);
                    }
                    summary.generated.push(file);
                }
                Err(source) => {
                    let failure = ItemFailure {
                        file_name: request.file_name.clone(),
                        source,
                    };
                    if !self.options.keep_going {
                        return Err(failure);
                    }
                    eprintln!("ERROR: {}", failure);
                    summary.failures.push(failure);
                }
            }
        }

        Ok(summary)
    }

    fn generate(&self, request: &VoiceRequest) -> Result<GeneratedFile, VoicegenError> {
        debug!(backend = self.backend.id(), file = %request.file_name, "synthesizing");
        let audio = self.backend.synthesize(&request.text, &request.tuning)?;

        let path = self.options.out_dir.join(&request.file_name);
        std::fs::write(&path, &audio).map_err(|e| VoicegenError::io(&path, e))?;

        Ok(GeneratedFile {
            file_name: request.file_name.clone(),
            path,
            bytes: audio.len(),
            duration: wav_duration(&audio),
        })
    }
}
