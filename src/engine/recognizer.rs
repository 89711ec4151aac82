//! Speech recognition engine seam.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TolmachError};
use crate::pipeline::types::AudioChunk;

/// Trait for speech-to-text engines.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait Recognizer: Send + Sync {
    /// Transcribes a chunk of 16 kHz mono audio to English text.
    ///
    /// Returns the recognized text, which may be empty when the engine
    /// heard nothing. Returns an error if the engine itself failed.
    fn recognize(&self, chunk: &AudioChunk) -> Result<String>;

    /// Returns the name of this engine for logging.
    fn name(&self) -> &str;
}

/// Mock recognizer for testing.
///
/// Returns a fixed response, or a scripted sequence of responses when
/// configured with `with_responses`.
pub struct MockRecognizer {
    scripted: Mutex<VecDeque<String>>,
    response: String,
    should_fail: bool,
    error_message: String,
    calls: AtomicUsize,
}

impl MockRecognizer {
    /// Creates a mock that recognizes every chunk as empty text.
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            response: String::new(),
            should_fail: false,
            error_message: "mock recognition failure".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Sets the text returned for every chunk.
    pub fn with_response(mut self, text: &str) -> Self {
        self.response = text.to_string();
        self
    }

    /// Scripts a sequence of responses, one per call.
    ///
    /// Once the script is exhausted the fixed response is returned.
    pub fn with_responses(self, texts: &[&str]) -> Self {
        {
            let mut scripted = self
                .scripted
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            scripted.extend(texts.iter().map(|t| t.to_string()));
        }
        self
    }

    /// Makes every call fail.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Sets the message used for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Number of recognize calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for MockRecognizer {
    fn recognize(&self, _chunk: &AudioChunk) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(TolmachError::Recognition {
                message: self.error_message.clone(),
            });
        }

        let mut scripted = self
            .scripted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(scripted.pop_front().unwrap_or_else(|| self.response.clone()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
