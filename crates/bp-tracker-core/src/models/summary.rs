//! Aggregated statistics over a window of readings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::BpCategory;

/// Direction of systolic pressure across a window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trend {
    /// Too few readings to compare halves
    InsufficientData,
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::InsufficientData => "Insufficient data",
            Trend::Increasing => "Increasing ↑",
            Trend::Decreasing => "Decreasing ↓",
            Trend::Stable => "Stable →",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived, read-only aggregate for a time window.
///
/// When `total_readings` is zero every statistic is `None` and `alerts` is
/// empty; check [`Summary::is_empty`] before rendering numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Summary {
    /// Range label the summary was computed for (e.g. "1w")
    pub range: String,
    pub total_readings: usize,
    pub avg_systolic: Option<f64>,
    pub min_systolic: Option<u32>,
    pub max_systolic: Option<u32>,
    pub avg_diastolic: Option<f64>,
    pub min_diastolic: Option<u32>,
    pub max_diastolic: Option<u32>,
    /// Pulse stats ignore readings without a pulse
    pub avg_pulse: Option<f64>,
    pub min_pulse: Option<u32>,
    pub max_pulse: Option<u32>,
    pub category: Option<BpCategory>,
    pub trend: Option<Trend>,
    pub suggestion: Option<String>,
    pub alerts: Vec<String>,
}

impl Summary {
    /// Summary of a window with no readings.
    pub fn empty(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_readings == 0
    }

    /// Whether any alert was raised.
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = Summary::empty("1w");
        assert!(summary.is_empty());
        assert_eq!(summary.range, "1w");
        assert!(summary.avg_systolic.is_none());
        assert!(summary.category.is_none());
        assert!(!summary.has_alerts());
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(Trend::Increasing.to_string(), "Increasing ↑");
        assert_eq!(Trend::InsufficientData.label(), "Insufficient data");
    }
}
