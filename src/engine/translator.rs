//! Text translation engine seam.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Result, TolmachError};

/// Trait for English-to-Russian text translation engines.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait Translator: Send + Sync {
    /// Translates English text to Russian.
    ///
    /// Implementations must return `Ok("")` for input that is empty after
    /// trimming, without invoking the underlying engine.
    fn translate(&self, text: &str) -> Result<String>;

    /// Returns the name of this engine for logging.
    fn name(&self) -> &str;
}

/// Mock translator for testing.
///
/// Echoes its input by default; specific phrases can be mapped with
/// `with_mapping`.
pub struct MockTranslator {
    mappings: HashMap<String, String>,
    response: Option<String>,
    should_fail: bool,
    error_message: String,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    call_counter: AtomicUsize,
}

impl MockTranslator {
    /// Creates a mock that echoes every input.
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            response: None,
            should_fail: false,
            error_message: "mock translation failure".to_string(),
            delay: None,
            calls: Mutex::new(Vec::new()),
            call_counter: AtomicUsize::new(0),
        }
    }

    /// Sets the text returned for every input.
    pub fn with_response(mut self, text: &str) -> Self {
        self.response = Some(text.to_string());
        self
    }

    /// Maps one exact input phrase to a translation.
    pub fn with_mapping(mut self, from: &str, to: &str) -> Self {
        self.mappings.insert(from.to_string(), to.to_string());
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

    /// All inputs passed to translate so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of translate calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_counter.load(Ordering::SeqCst)
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for MockTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        self.call_counter.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(text.to_string());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if self.should_fail {
            return Err(TolmachError::Translation {
                message: self.error_message.clone(),
            });
        }

        if let Some(mapped) = self.mappings.get(text) {
            return Ok(mapped.clone());
        }
        if let Some(response) = &self.response {
            return Ok(response.clone());
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
