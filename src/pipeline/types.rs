//! Data types flowing through the translation pipeline.

use serde::Serialize;

/// A decoded chunk of PCM audio ready for recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// PCM samples (16-bit signed integers, mono).
    pub samples: Vec<i16>,
    /// Sample rate of the decoded audio in Hz.
    pub sample_rate: u32,
    /// Channel count of the source container before downmixing.
    pub channels: u16,
}

impl AudioChunk {
    /// Creates a mono audio chunk.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Duration of the chunk in milliseconds, rounded down.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / u64::from(self.sample_rate)
    }
}

/// Identifier correlating one utterance across all pipeline stages.
///
/// The sequence component is strictly increasing for the lifetime of the
/// process, so log lines from different stages can be matched up even when
/// two utterances were captured in the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId {
    /// Strictly increasing sequence number, starting at 1.
    pub sequence: u64,
    /// Wall-clock issue time in milliseconds since the Unix epoch.
    pub issued_ms: u64,
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req_{}_{}", self.sequence, self.issued_ms)
    }
}

impl PartialOrd for CorrelationId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CorrelationId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sequence.cmp(&other.sequence)
    }
}

/// A payload travelling between stages together with its correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMessage<T> {
    /// Identifier assigned when the utterance passed the text gate.
    pub id: CorrelationId,
    /// Stage output being handed to the next stage.
    pub payload: T,
}

impl<T> StageMessage<T> {
    /// Creates a stage message.
    pub fn new(id: CorrelationId, payload: T) -> Self {
        Self { id, payload }
    }
}

/// Snapshot of pipeline state returned by status queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStatus {
    /// Whether the stage workers are currently running.
    pub running: bool,
    /// Chunks waiting for the recognition stage.
    pub recognition_queue: usize,
    /// Accepted utterances waiting for the translation stage.
    pub translation_queue: usize,
    /// Translations waiting for the synthesis stage.
    pub synthesis_queue: usize,
    /// Total correlation ids issued since process start.
    pub requests: u64,
}

/// Result of pushing one chunk through all three stages synchronously.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkOutcome {
    /// Identifier assigned to the chunk.
    pub id: CorrelationId,
    /// Recognized English text.
    pub english_text: String,
    /// Translated Russian text.
    pub russian_text: String,
    /// Synthesized Russian speech samples.
    pub samples: Vec<i16>,
}

/// Result of translating a whole audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    /// Recognized English text.
    pub english_text: String,
    /// Translated Russian text.
    pub russian_text: String,
    /// Number of synthesized audio samples.
    pub audio_sample_count: usize,
}
