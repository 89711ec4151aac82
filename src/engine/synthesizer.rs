//! Speech synthesis engine seam.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Result, TolmachError};

/// Trait for text-to-speech engines.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait Synthesizer: Send + Sync {
    /// Synthesizes Russian text to 22.05 kHz mono PCM samples.
    ///
    /// Implementations must return an empty buffer for input that is empty
    /// after trimming, without invoking the underlying engine.
    fn synthesize(&self, text: &str) -> Result<Vec<i16>>;

    /// Returns the name of this engine for logging.
    fn name(&self) -> &str;
}

/// Mock synthesizer for testing.
///
/// Produces a deterministic waveform whose length is proportional to the
/// input length, so sample-count assertions are reproducible.
pub struct MockSynthesizer {
    samples_per_char: usize,
    fixed_samples: Option<Vec<i16>>,
    should_fail: bool,
    error_message: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSynthesizer {
    /// Creates a mock producing 160 samples per input character.
    pub fn new() -> Self {
        Self {
            samples_per_char: 160,
            fixed_samples: None,
            should_fail: false,
            error_message: "mock synthesis failure".to_string(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sets how many samples each input character produces.
    pub fn with_samples_per_char(mut self, count: usize) -> Self {
        self.samples_per_char = count;
        self
    }

    /// Returns exactly these samples for every non-empty input.
    pub fn with_samples(mut self, samples: Vec<i16>) -> Self {
        self.fixed_samples = Some(samples);
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

    /// Sleeps this long on every call, for queue-depth tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of synthesize calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<i16>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if self.should_fail {
            return Err(TolmachError::Synthesis {
                message: self.error_message.clone(),
            });
        }

        if let Some(samples) = &self.fixed_samples {
            return Ok(samples.clone());
        }

        let total = text.chars().count() * self.samples_per_char;
        Ok((0..total).map(|i| ((i % 100) as i16 - 50) * 64).collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
