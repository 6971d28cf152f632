//! Keyword canonicalization for utterances.
//!
//! Handles:
//! - Abbreviations and synonyms (sys→systolic, heartrate→heart rate)
//! - Misheard keywords from speech-to-text (diastolik→diastolic)

use std::collections::HashMap;

use strsim::{jaro_winkler, normalized_levenshtein};

/// Keywords eligible for fuzzy snapping. Short words like "over" are left
/// alone since near-misses ("oven", "ever") are ordinary words.
const FUZZY_KEYWORDS: &[&str] = &["systolic", "diastolic", "pulse"];

/// Minimum similarity for a token to be snapped to a keyword.
const SNAP_THRESHOLD: f64 = 0.85;

/// Shortest token considered for fuzzy snapping.
const MIN_SNAP_LEN: usize = 5;

/// Canonicalizes keyword tokens in a lowercase utterance.
pub struct KeywordNormalizer {
    /// Token alias map: spoken/abbreviated form → canonical form
    aliases: HashMap<String, String>,
    /// Phrase replacements applied before tokenizing
    phrases: Vec<(String, String)>,
}

impl Default for KeywordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordNormalizer {
    pub fn new() -> Self {
        Self {
            aliases: Self::default_aliases(),
            phrases: Self::default_phrases(),
        }
    }

    /// Canonicalize every token of `text`.
    pub fn normalize(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (phrase, replacement) in &self.phrases {
            text = text.replace(phrase.as_str(), replacement);
        }

        text.split_whitespace()
            .map(|token| self.canonicalize(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Canonical form of a single token.
    pub fn canonicalize(&self, token: &str) -> String {
        if let Some(canonical) = self.aliases.get(token) {
            return canonical.clone();
        }
        self.snap(token).unwrap_or_else(|| token.to_string())
    }

    /// Add a custom alias.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.to_lowercase(), canonical.to_lowercase());
    }

    /// Nearest fuzzy keyword for an alphabetic token, if close enough.
    fn snap(&self, token: &str) -> Option<String> {
        if token.len() < MIN_SNAP_LEN || !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        FUZZY_KEYWORDS
            .iter()
            .map(|keyword| (*keyword, keyword_similarity(token, keyword)))
            .filter(|(_, score)| *score >= SNAP_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(keyword, _)| keyword.to_string())
    }

    fn default_aliases() -> HashMap<String, String> {
        let mut map = HashMap::new();

        // Systolic
        map.insert("sys".into(), "systolic".into());
        map.insert("systole".into(), "systolic".into());
        map.insert("upper".into(), "systolic".into());
        map.insert("top".into(), "systolic".into());

        // Diastolic
        map.insert("dia".into(), "diastolic".into());
        map.insert("dias".into(), "diastolic".into());
        map.insert("diastole".into(), "diastolic".into());
        map.insert("lower".into(), "diastolic".into());
        map.insert("bottom".into(), "diastolic".into());

        // Pulse
        map.insert("heartrate".into(), "heart rate".into());
        map.insert("pulses".into(), "pulse".into());
        map.insert("beats".into(), "bpm".into());

        // Separators
        map.insert("slash".into(), "/".into());

        map
    }

    fn default_phrases() -> Vec<(String, String)> {
        vec![
            ("beats per minute".into(), "bpm".into()),
            ("beats a minute".into(), "bpm".into()),
            ("blood pressure".into(), "bp".into()),
            ("heart beat".into(), "pulse".into()),
            ("heartbeat".into(), "pulse".into()),
        ]
    }
}

/// Combined fuzzy similarity: Jaro-Winkler for typos, Levenshtein for overall shape.
fn keyword_similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        let normalizer = KeywordNormalizer::new();
        assert_eq!(normalizer.canonicalize("sys"), "systolic");
        assert_eq!(normalizer.canonicalize("dia"), "diastolic");
        assert_eq!(normalizer.canonicalize("slash"), "/");
        assert_eq!(normalizer.canonicalize("heartrate"), "heart rate");
    }

    #[test]
    fn test_misheard_keywords_snap() {
        let normalizer = KeywordNormalizer::new();
        assert_eq!(normalizer.canonicalize("diastolik"), "diastolic");
        assert_eq!(normalizer.canonicalize("systolik"), "systolic");
        assert_eq!(normalizer.canonicalize("pulss"), "pulse");
    }

    #[test]
    fn test_ordinary_words_untouched() {
        let normalizer = KeywordNormalizer::new();
        assert_eq!(normalizer.canonicalize("false"), "false");
        assert_eq!(normalizer.canonicalize("banana"), "banana");
        assert_eq!(normalizer.canonicalize("over"), "over");
        assert_eq!(normalizer.canonicalize("120"), "120");
        // Too short to snap
        assert_eq!(normalizer.canonicalize("puls"), "puls");
    }

    #[test]
    fn test_phrases() {
        let normalizer = KeywordNormalizer::new();
        assert_eq!(
            normalizer.normalize("blood pressure 120 over 80 at 72 beats per minute"),
            "bp 120 over 80 at 72 bpm"
        );
    }

    #[test]
    fn test_custom_alias() {
        let mut normalizer = KeywordNormalizer::new();
        normalizer.add_alias("Ticker", "pulse");
        assert_eq!(normalizer.canonicalize("ticker"), "pulse");
    }
}
