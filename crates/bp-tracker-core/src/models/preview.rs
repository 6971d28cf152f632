//! Phrase parser output.

use serde::{Deserialize, Serialize};

/// Transient outcome of parsing an utterance. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsePreview {
    /// Whether a complete, in-range reading was found
    pub success: bool,
    /// Human-readable outcome, shown inline under the input
    pub message: String,
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
    pub pulse: Option<u32>,
    /// The utterance as received
    pub raw_text: String,
}

impl ParsePreview {
    /// A failed preview carrying only a reason.
    pub fn failure(raw_text: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            systolic: None,
            diastolic: None,
            pulse: None,
            raw_text: raw_text.to_string(),
        }
    }

    /// A successful preview with the standard confirmation message.
    pub fn parsed(raw_text: &str, systolic: u32, diastolic: u32, pulse: Option<u32>) -> Self {
        let pulse_part = pulse.map(|p| format!(" pulse {}", p)).unwrap_or_default();
        Self {
            success: true,
            message: format!("Successfully parsed: {}/{}{}", systolic, diastolic, pulse_part),
            systolic: Some(systolic),
            diastolic: Some(diastolic),
            pulse,
            raw_text: raw_text.to_string(),
        }
    }

    /// The parsed values, if the preview succeeded.
    pub fn values(&self) -> Option<(u32, u32, Option<u32>)> {
        match (self.success, self.systolic, self.diastolic) {
            (true, Some(sys), Some(dia)) => Some((sys, dia, self.pulse)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_message() {
        let preview = ParsePreview::parsed("120 over 80 pulse 72", 120, 80, Some(72));
        assert_eq!(preview.message, "Successfully parsed: 120/80 pulse 72");
        assert_eq!(preview.values(), Some((120, 80, Some(72))));

        let preview = ParsePreview::parsed("120/80", 120, 80, None);
        assert_eq!(preview.message, "Successfully parsed: 120/80");
    }

    #[test]
    fn test_failure_has_no_values() {
        let preview = ParsePreview::failure("banana", "nope");
        assert!(!preview.success);
        assert_eq!(preview.values(), None);
        assert_eq!(preview.raw_text, "banana");
    }
}
