//! Playback sinks for synthesized audio.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Result, TolmachError};

/// Destination for synthesized speech at the end of the pipeline.
///
/// Sinks receive one burst of samples per translated utterance. Playback
/// failures are logged by the synthesis stage and never propagate upstream.
pub trait PlaybackSink: Send + 'static {
    /// Plays one burst of 22.05 kHz mono samples.
    fn play(&mut self, samples: &[i16]) -> Result<()>;

    /// Called once when the pipeline shuts down.
    ///
    /// Override this to flush buffered output.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns the name of this sink for logging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Sink that drops all audio, logging only the burst size.
#[derive(Debug, Clone, Default)]
pub struct DiscardSink;

impl DiscardSink {
    /// Creates a discarding sink.
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackSink for DiscardSink {
    fn play(&mut self, samples: &[i16]) -> Result<()> {
        tracing::debug!(samples = samples.len(), "discarding synthesized audio");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discard"
    }
}

/// Sink that collects every burst in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct CollectorSink {
    collected: Arc<Mutex<Vec<Vec<i16>>>>,
}

impl CollectorSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self {
            collected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle to the collected bursts.
    ///
    /// The handle stays valid after the sink itself has been moved into
    /// the pipeline.
    pub fn handle(&self) -> Arc<Mutex<Vec<Vec<i16>>>> {
        Arc::clone(&self.collected)
    }
}

impl PlaybackSink for CollectorSink {
    fn play(&mut self, samples: &[i16]) -> Result<()> {
        self.collected
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(samples.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Sink that appends every burst to a WAV file.
pub struct WavFileSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    path: PathBuf,
}

impl WavFileSink {
    /// Creates the output file, truncating any existing content.
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path, spec).map_err(|e| TolmachError::Playback {
            message: format!("failed to create {}: {}", path.display(), e),
        })?;
        Ok(Self {
            writer: Some(writer),
            path: path.to_path_buf(),
        })
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlaybackSink for WavFileSink {
    fn play(&mut self, samples: &[i16]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(TolmachError::Playback {
                message: format!("{} already finalized", self.path.display()),
            });
        };
        for &sample in samples {
            writer.write_sample(sample).map_err(|e| TolmachError::Playback {
                message: format!("failed to write {}: {}", self.path.display(), e),
            })?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().map_err(|e| TolmachError::Playback {
                message: format!("failed to finalize {}: {}", self.path.display(), e),
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "wav-file"
    }
}
