//! The three processing stages of the translation pipeline.

use std::sync::Arc;

use crate::engine::{PlaybackSink, Recognizer, Synthesizer, Translator};
use crate::error::Result;
use crate::pipeline::gate;
use crate::pipeline::tracker::RequestTracker;
use crate::pipeline::types::{AudioChunk, StageMessage};
use crate::pipeline::worker::Stage;

/// Recognition stage: audio in, gated English text out.
///
/// Owns the gate state. The previously accepted text lives here because
/// this stage is the single writer deciding what enters the pipeline.
pub struct RecognitionStage {
    recognizer: Arc<dyn Recognizer>,
    tracker: Arc<RequestTracker>,
    denylist: Vec<String>,
    last_accepted: Option<String>,
}

impl RecognitionStage {
    /// Creates the recognition stage.
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        tracker: Arc<RequestTracker>,
        denylist: Vec<String>,
    ) -> Self {
        Self {
            recognizer,
            tracker,
            denylist,
            last_accepted: None,
        }
    }
}

impl Stage for RecognitionStage {
    type Input = AudioChunk;
    type Output = StageMessage<String>;

    fn process(&mut self, chunk: Self::Input) -> Result<Option<Self::Output>> {
        let text = self.recognizer.recognize(&chunk)?;

        if !gate::accept(&text, self.last_accepted.as_deref(), &self.denylist) {
            tracing::debug!(text = %text.trim(), "gate rejected utterance");
            return Ok(None);
        }

        let trimmed = text.trim().to_string();
        let id = self.tracker.next();
        self.last_accepted = Some(trimmed.clone());
        tracing::info!(%id, text = %trimmed, "accepted utterance");
        Ok(Some(StageMessage::new(id, trimmed)))
    }

    fn name(&self) -> &'static str {
        "recognition"
    }
}

/// Translation stage: English text in, Russian text out.
pub struct TranslationStage {
    translator: Arc<dyn Translator>,
}

impl TranslationStage {
    /// Creates the translation stage.
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }
}

impl Stage for TranslationStage {
    type Input = StageMessage<String>;
    type Output = StageMessage<String>;

    fn process(&mut self, message: Self::Input) -> Result<Option<Self::Output>> {
        let russian = self.translator.translate(&message.payload)?;

        if russian.trim().is_empty() {
            tracing::warn!(id = %message.id, "translation produced empty text, dropping");
            return Ok(None);
        }

        tracing::info!(id = %message.id, text = %russian, "translated utterance");
        Ok(Some(StageMessage::new(message.id, russian)))
    }

    fn name(&self) -> &'static str {
        "translation"
    }
}

/// Synthesis stage: Russian text in, audio out to the playback sink.
///
/// This is the final stage. Playback failures are logged and swallowed so
/// a broken sink cannot take the pipeline down.
pub struct SynthesisStage {
    synthesizer: Arc<dyn Synthesizer>,
    playback: Box<dyn PlaybackSink>,
}

impl SynthesisStage {
    /// Creates the synthesis stage around a playback sink.
    pub fn new(synthesizer: Arc<dyn Synthesizer>, playback: Box<dyn PlaybackSink>) -> Self {
        Self {
            synthesizer,
            playback,
        }
    }
}

impl Stage for SynthesisStage {
    type Input = StageMessage<String>;
    type Output = ();

    fn process(&mut self, message: Self::Input) -> Result<Option<Self::Output>> {
        let samples = self.synthesizer.synthesize(&message.payload)?;

        if samples.is_empty() {
            tracing::warn!(id = %message.id, "synthesis produced empty audio, dropping");
            return Ok(None);
        }

        tracing::info!(id = %message.id, samples = samples.len(), "synthesized utterance");
        if let Err(error) = self.playback.play(&samples) {
            tracing::warn!(id = %message.id, sink = self.playback.name(), %error, "playback failed");
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "synthesis"
    }

    fn shutdown(&mut self) {
        if let Err(error) = self.playback.finish() {
            tracing::warn!(sink = self.playback.name(), %error, "failed to finish playback sink");
        }
    }
}
