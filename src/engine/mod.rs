//! Engine seams for the three translation stages.
//!
//! Each stage talks to its engine through a trait object, so the pipeline
//! and session handler never know whether they are driving an external
//! command or a test mock.

pub mod command;
pub mod playback;
pub mod recognizer;
pub mod synthesizer;
pub mod translator;

pub use command::{
    CommandRecognizer, CommandRunner, CommandSynthesizer, CommandTranslator, SystemRunner,
};
pub use playback::{CollectorSink, DiscardSink, PlaybackSink, WavFileSink};
pub use recognizer::{MockRecognizer, Recognizer};
pub use synthesizer::{MockSynthesizer, Synthesizer};
pub use translator::{MockTranslator, Translator};

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;

/// The three engine handles a pipeline is wired with.
#[derive(Clone)]
pub struct StageServices {
    /// Speech-to-text engine.
    pub recognizer: Arc<dyn Recognizer>,
    /// English-to-Russian translation engine.
    pub translator: Arc<dyn Translator>,
    /// Text-to-speech engine.
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl StageServices {
    /// Bundles three engine handles.
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            recognizer,
            translator,
            synthesizer,
        }
    }

    /// Builds command-backed engines from configuration.
    ///
    /// Fails if any of the three command lines is missing.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            recognizer: Arc::new(CommandRecognizer::new(&config.recognize)?),
            translator: Arc::new(CommandTranslator::new(&config.translate)?),
            synthesizer: Arc::new(CommandSynthesizer::new(&config.synthesize)?),
        })
    }
}
