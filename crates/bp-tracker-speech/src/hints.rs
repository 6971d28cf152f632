//! Recognizer settings and the example phrases shown next to the mic button.

use serde::{Deserialize, Serialize};

/// Settings handed to the platform recognizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecognizerSettings {
    /// BCP 47 language tag
    pub lang: String,
    /// Report partial results while the user is still speaking
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// Phrases the parser is known to understand.
pub const EXAMPLE_UTTERANCES: &[&str] = &[
    "120 over 80 pulse 72",
    "135/90 heart rate 68",
    "systolic 118 diastolic 76 pulse 80",
    "BP 125 by 82 pulse rate 70",
];

/// One-line hint for the voice tab.
pub fn voice_hint() -> String {
    format!("Try saying: \"{}\"", EXAMPLE_UTTERANCES[0])
}
