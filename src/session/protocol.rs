//! JSON reply frames for the realtime session protocol.

use serde::{Deserialize, Serialize};

/// Text frame sent after the audio frame of a successful exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationReply {
    /// Recognized English text, or the fallback phrase for silent audio.
    pub english_text: String,
    /// Translated Russian text.
    pub russian_text: String,
    /// End-to-end processing time of the chunk, in seconds.
    pub processing_time: f64,
}

impl TranslationReply {
    /// Serialize reply to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize reply from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// The single frame sent when a chunk fails; the session stays open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Human-readable failure description.
    pub error: String,
}

impl ErrorReply {
    /// Creates a reply from any displayable error.
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }

    /// Serialize reply to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize reply from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_reply_json_roundtrip() {
        let reply = TranslationReply {
            english_text: "hello world".to_string(),
            russian_text: "привет мир".to_string(),
            processing_time: 0.25,
        };

        let json = reply.to_json().expect("should serialize");
        let deserialized = TranslationReply::from_json(&json).expect("should deserialize");
        assert_eq!(reply, deserialized);
    }

    #[test]
    fn test_translation_reply_field_names() {
        let reply = TranslationReply {
            english_text: "hi".to_string(),
            russian_text: "привет".to_string(),
            processing_time: 1.5,
        };

        let json = reply.to_json().expect("should serialize");
        assert_eq!(
            json,
            r#"{"english_text":"hi","russian_text":"привет","processing_time":1.5}"#
        );
    }

    #[test]
    fn test_translation_reply_time_is_fractional_seconds() {
        let json = r#"{"english_text":"a","russian_text":"б","processing_time":0.125}"#;
        let reply = TranslationReply::from_json(json).expect("should deserialize");
        assert!((reply.processing_time - 0.125).abs() < f64::EPSILON);
    }

    #[test]
    fn test_error_reply_json() {
        let reply = ErrorReply::new("Expected 16000 Hz audio, got 8000 Hz");
        let json = reply.to_json().expect("should serialize");
        assert_eq!(json, r#"{"error":"Expected 16000 Hz audio, got 8000 Hz"}"#);
    }

    #[test]
    fn test_error_reply_from_error_type() {
        let error = crate::error::TolmachError::EmptyAudio;
        let reply = ErrorReply::new(&error);
        assert_eq!(reply.error, "Decoded audio is empty");
    }

    #[test]
    fn test_error_reply_roundtrip() {
        let reply = ErrorReply::new("boom");
        let parsed = ErrorReply::from_json(&reply.to_json().unwrap()).unwrap();
        assert_eq!(reply, parsed);
    }
}
