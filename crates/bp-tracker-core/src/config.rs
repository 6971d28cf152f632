//! Tracker configuration.
//!
//! Every section has defaults, so an empty JSON object is a valid config.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Inclusive bounds for a measured value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Plausibility limits applied to parsed and manually entered values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserLimits {
    pub systolic: Bounds,
    pub diastolic: Bounds,
    pub pulse: Bounds,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            systolic: Bounds::new(60, 250),
            diastolic: Bounds::new(40, 150),
            pulse: Bounds::new(30, 220),
        }
    }
}

/// Which reading(s) decide the category of a summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryBasis {
    /// Most severe category of any reading in the window
    #[default]
    Worst,
    /// Category of the most recent reading
    Latest,
    /// Category of the window's mean systolic/diastolic
    Average,
}

/// Summary aggregation settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummaryConfig {
    pub category_basis: CategoryBasis,
    /// Systolic difference (mmHg) between window halves that counts as a trend
    pub trend_threshold: f64,
    /// Fewer readings than this report insufficient data
    pub min_trend_readings: usize,
    /// Average pulse above this raises an alert
    pub high_pulse: f64,
    /// Average pulse below this raises an alert
    pub low_pulse: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            category_basis: CategoryBasis::Worst,
            trend_threshold: 5.0,
            min_trend_readings: 3,
            high_pulse: 100.0,
            low_pulse: 50.0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TrackerConfig {
    pub parser: ParserLimits,
    pub summary: SummaryConfig,
}

impl TrackerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: TrackerConfig =
            serde_json::from_str(json).context("Invalid tracker config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load config {}", path.display()))
    }

    /// Check bounds ordering and threshold signs.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, bounds) in [
            ("systolic", self.parser.systolic),
            ("diastolic", self.parser.diastolic),
            ("pulse", self.parser.pulse),
        ] {
            anyhow::ensure!(
                bounds.min <= bounds.max,
                "{} bounds are inverted: min {} > max {}",
                name,
                bounds.min,
                bounds.max
            );
        }

        let summary = &self.summary;
        anyhow::ensure!(
            summary.trend_threshold > 0.0,
            "trend_threshold must be positive"
        );
        anyhow::ensure!(
            summary.min_trend_readings >= 2,
            "min_trend_readings must be at least 2"
        );
        anyhow::ensure!(
            summary.low_pulse < summary.high_pulse,
            "low_pulse must be below high_pulse"
        );
        Ok(())
    }
}
