//! Speech recognizer port and decoding of recognizer output.

use bp_tracker_core::models::ParsePreview;
use bp_tracker_core::parser::PhraseParser;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when the device has no speech recognizer.
pub const NOT_SUPPORTED_MESSAGE: &str = "Voice input is not supported on this device";

/// Speech errors.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Voice input is not supported on this device")]
    NotSupported,

    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("No speech detected")]
    NoSpeech,

    #[error("Microphone unavailable")]
    AudioCapture,

    #[error("Network error during recognition")]
    Network,

    #[error("Recognition aborted")]
    Aborted,

    #[error("Recognizer error: {0}")]
    Platform(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid recognizer output: {0}")]
    InvalidFormat(String),
}

impl SpeechError {
    /// Map a platform error code (`not-allowed`, `no-speech`, ...).
    pub fn from_platform_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "not-allowed" | "service-not-allowed" => SpeechError::PermissionDenied,
            "no-speech" => SpeechError::NoSpeech,
            "audio-capture" => SpeechError::AudioCapture,
            "network" => SpeechError::Network,
            "aborted" => SpeechError::Aborted,
            "not-supported" | "language-not-supported" => SpeechError::NotSupported,
            other => SpeechError::Platform(other.to_string()),
        }
    }

    /// Whether asking the user to try again makes sense.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SpeechError::NoSpeech | SpeechError::Network | SpeechError::Aborted
        )
    }
}

pub type SpeechResult<T> = Result<T, SpeechError>;

/// One recognition hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A recognizer result as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognitionOutput {
    pub alternatives: Vec<Alternative>,
    #[serde(default = "default_final")]
    pub is_final: bool,
}

fn default_final() -> bool {
    true
}

impl RecognitionOutput {
    /// Highest-confidence non-blank transcript, trimmed. Alternatives without
    /// a confidence rank below any that have one; ties keep platform order.
    pub fn best_transcript(&self) -> Option<&str> {
        let mut best: Option<&Alternative> = None;
        for alt in self.alternatives.iter().filter(|a| !a.transcript.trim().is_empty()) {
            let better = match best {
                None => true,
                Some(current) => alt.confidence.unwrap_or(-1.0) > current.confidence.unwrap_or(-1.0),
            };
            if better {
                best = Some(alt);
            }
        }
        best.map(|a| a.transcript.trim())
    }
}

/// Parse recognizer output JSON, ignoring any text around the object.
pub fn parse_recognition_output(raw: &str) -> SpeechResult<RecognitionOutput> {
    let json_start = raw
        .find('{')
        .ok_or_else(|| SpeechError::InvalidFormat("No JSON object found in output".into()))?;
    let json_end = raw
        .rfind('}')
        .ok_or_else(|| SpeechError::InvalidFormat("No closing brace found in output".into()))?;
    if json_end < json_start {
        return Err(SpeechError::InvalidFormat("Unbalanced braces in output".into()));
    }

    let output: RecognitionOutput = serde_json::from_str(&raw[json_start..=json_end])?;
    Ok(output)
}

/// A platform speech-to-text capability.
pub trait SpeechRecognizer {
    fn is_supported(&self) -> bool;

    /// Listen for one utterance and return its final transcript.
    fn listen(&mut self) -> SpeechResult<String>;
}

/// Recognizer for devices without speech input.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRecognizer;

impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn listen(&mut self) -> SpeechResult<String> {
        Err(SpeechError::NotSupported)
    }
}

/// Recognizer that replays queued results, in order.
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    script: std::collections::VecDeque<SpeechResult<String>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, transcript: &str) -> Self {
        self.script.push_back(Ok(transcript.to_string()));
        self
    }

    pub fn fail(mut self, error: SpeechError) -> Self {
        self.script.push_back(Err(error));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    fn listen(&mut self) -> SpeechResult<String> {
        self.script.pop_front().unwrap_or(Err(SpeechError::NoSpeech))
    }
}

/// Listen once and parse what was heard.
///
/// Recognizer failures come back as a failed preview, never as an error.
pub fn listen_and_preview(
    recognizer: &mut dyn SpeechRecognizer,
    parser: &PhraseParser,
) -> ParsePreview {
    if !recognizer.is_supported() {
        return ParsePreview::failure("", NOT_SUPPORTED_MESSAGE);
    }

    match recognizer.listen() {
        Ok(transcript) => {
            debug!("Heard: {:?}", transcript);
            parser.parse(&transcript)
        }
        Err(SpeechError::NotSupported) => ParsePreview::failure("", NOT_SUPPORTED_MESSAGE),
        Err(e) => {
            warn!("Voice input failed: {}", e);
            ParsePreview::failure("", format!("Voice error: {}", e))
        }
    }
}
