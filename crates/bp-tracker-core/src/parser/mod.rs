//! Phrase parser for spoken and typed readings.
//!
//! Pipeline: lowercase → punctuation cleanup → number words → keywords → pattern match → bounds check
//!
//! Parsing is a pure function of the input and the configured limits; a
//! [`PhraseParser`] can be shared freely between callers.

mod keywords;
mod numbers;

pub use keywords::*;
pub use numbers::*;

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::config::ParserLimits;
use crate::models::ParsePreview;

/// Shown when no systolic/diastolic pair can be found.
pub const NOT_FOUND_MESSAGE: &str =
    "Could not find BP values. Try saying: '120 over 80 pulse 72'";

/// Shown for empty input.
pub const EMPTY_MESSAGE: &str = "No input provided";

/// `120 over 80`, `120/80`, `120 by 80`
static PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{2,3})\s*(?:over|by|/)\s*(\d{2,3})\b").expect("valid pair pattern")
});

/// `120-80`; also matches date fragments, so tried last
static DASH_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{2,3})\s*-\s*(\d{2,3})\b").expect("valid dash pair pattern")
});

/// `systolic 120`, `systolic is 120`
static SYSTOLIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bsystolic\s+(?:is\s+|of\s+|at\s+)?(\d{2,3})\b").expect("valid systolic pattern")
});

/// `diastolic 80`, `diastolic is 80`
static DIASTOLIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdiastolic\s+(?:is\s+|of\s+|at\s+)?(\d{2,3})\b")
        .expect("valid diastolic pattern")
});

/// `pulse 72`, `pulse rate is 72`, `heart rate 72`, `hr 72`
static PULSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:pulse(?:\s+rate)?|heart\s+rate|hr)\s+(?:is\s+|of\s+|at\s+)?(\d{2,3})\b")
        .expect("valid pulse pattern")
});

/// `72 bpm`
static PULSE_BPM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2,3})\s*bpm\b").expect("valid bpm pattern"));

/// `120/80 72`: a bare number right after the pair
static PULSE_TRAILING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(\d{2,3})\b").expect("valid trailing pulse pattern"));

/// Hyphen joining two words ("seventy-two", "heart-rate").
static WORD_HYPHEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])-([a-z])").expect("valid hyphen pattern"));

/// Parses utterances like "120 over 80 pulse 72" into a [`ParsePreview`].
pub struct PhraseParser {
    limits: ParserLimits,
    numbers: NumberWords,
    keywords: KeywordNormalizer,
}

impl Default for PhraseParser {
    fn default() -> Self {
        Self::new(ParserLimits::default())
    }
}

impl PhraseParser {
    /// Create a parser with the given plausibility limits.
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            limits,
            numbers: NumberWords::new(),
            keywords: KeywordNormalizer::new(),
        }
    }

    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// Parse an utterance.
    pub fn parse(&self, text: &str) -> ParsePreview {
        if text.trim().is_empty() {
            return ParsePreview::failure(text, EMPTY_MESSAGE);
        }

        let normalized = self.normalize(text);
        debug!("Normalized utterance: {:?}", normalized);

        let candidates = pressure_candidates(&normalized);
        let chosen = candidates
            .iter()
            .find(|c| self.pressure_in_limits(c))
            .or_else(|| candidates.first());
        let PressureCandidate {
            systolic,
            diastolic,
            pair_end,
        } = match chosen {
            Some(candidate) => *candidate,
            None => {
                debug!("No blood pressure pair found");
                return ParsePreview::failure(text, NOT_FOUND_MESSAGE);
            }
        };
        let pulse = extract_pulse(&normalized, pair_end);

        if !self.limits.systolic.contains(systolic) || !self.limits.diastolic.contains(diastolic)
        {
            return ParsePreview::failure(
                text,
                format!(
                    "BP values seem out of range. Please check: systolic={}, diastolic={}",
                    systolic, diastolic
                ),
            );
        }

        if let Some(p) = pulse {
            if !self.limits.pulse.contains(p) {
                return ParsePreview::failure(
                    text,
                    format!(
                        "Pulse value seems out of range. Please check: pulse={} (expected {}-{})",
                        p, self.limits.pulse.min, self.limits.pulse.max
                    ),
                );
            }
        }

        debug!(
            "Parsed reading {}/{} pulse {:?}",
            systolic, diastolic, pulse
        );
        ParsePreview::parsed(text, systolic, diastolic, pulse)
    }

    fn pressure_in_limits(&self, candidate: &PressureCandidate) -> bool {
        self.limits.systolic.contains(candidate.systolic)
            && self.limits.diastolic.contains(candidate.diastolic)
    }

    /// Reduce an utterance to lowercase digits, canonical keywords and separators.
    pub fn normalize(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let unhyphenated = WORD_HYPHEN.replace_all(&lower, "$1 $2");

        let cleaned: String = unhyphenated
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '/' || c == '-' || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        let with_digits = self.numbers.convert(&cleaned);
        self.keywords.normalize(&with_digits)
    }
}

/// Parse with default limits.
pub fn parse_utterance(text: &str) -> ParsePreview {
    PhraseParser::default().parse(text)
}

/// A systolic/diastolic reading found in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PressureCandidate {
    systolic: u32,
    diastolic: u32,
    /// Byte offset just past a `120/80`-style pair; `None` for the keyword form.
    pair_end: Option<usize>,
}

/// Every reading the text could mean, most trusted form first:
/// `over`/`by`/`/` pairs, then keywords in any order, then dash pairs.
fn pressure_candidates(text: &str) -> Vec<PressureCandidate> {
    let mut candidates = pair_matches(&PAIR, text);

    if let (Some(systolic), Some(diastolic)) =
        (first_capture(&SYSTOLIC, text), first_capture(&DIASTOLIC, text))
    {
        candidates.push(PressureCandidate {
            systolic,
            diastolic,
            pair_end: None,
        });
    }

    candidates.extend(pair_matches(&DASH_PAIR, text));
    candidates
}

fn pair_matches(re: &Regex, text: &str) -> Vec<PressureCandidate> {
    re.captures_iter(text)
        .filter_map(|caps| {
            Some(PressureCandidate {
                systolic: caps.get(1)?.as_str().parse().ok()?,
                diastolic: caps.get(2)?.as_str().parse().ok()?,
                pair_end: Some(caps.get(0)?.end()),
            })
        })
        .collect()
}

/// Pulse from a keyword, a `bpm` suffix, or a bare number trailing the pair.
fn extract_pulse(text: &str, pair_end: Option<usize>) -> Option<u32> {
    first_capture(&PULSE, text)
        .or_else(|| first_capture(&PULSE_BPM, text))
        .or_else(|| first_capture(&PULSE_TRAILING, text.get(pair_end?..)?))
}

fn first_capture(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
