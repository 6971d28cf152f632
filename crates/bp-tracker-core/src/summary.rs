//! Summary aggregation over a window of readings.

use log::debug;

use crate::classifier::{
    classify_mean, BpCategory, CRISIS_DIASTOLIC, CRISIS_SYSTOLIC, STAGE2_DIASTOLIC,
    STAGE2_SYSTOLIC,
};
use crate::config::{CategoryBasis, SummaryConfig};
use crate::models::{Reading, Summary, Trend};

/// Computes [`Summary`] values. Holds only configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator {
    config: SummaryConfig,
}

/// Min, rounded mean and max of a series.
struct Stats {
    min: u32,
    mean: f64,
    max: u32,
}

impl Stats {
    fn of(values: impl Iterator<Item = u32>) -> Option<Stats> {
        let mut count = 0u32;
        let mut sum = 0u64;
        let mut min = u32::MAX;
        let mut max = u32::MIN;
        for v in values {
            count += 1;
            sum += u64::from(v);
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| Stats {
            min,
            mean: sum as f64 / f64::from(count),
            max,
        })
    }
}

impl SummaryAggregator {
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summarize `readings` for the range labelled `range`.
    ///
    /// Readings may arrive in any order; they are ordered by `recorded_at`
    /// before the trend and latest-reading category are computed.
    pub fn summarize(&self, range: &str, readings: &[Reading]) -> Summary {
        if readings.is_empty() {
            return Summary::empty(range);
        }

        let mut ordered: Vec<&Reading> = readings.iter().collect();
        ordered.sort_by_key(|r| r.recorded_at);

        // Non-empty, so both series have at least one value
        let systolic = Stats::of(ordered.iter().map(|r| r.systolic));
        let diastolic = Stats::of(ordered.iter().map(|r| r.diastolic));
        let pulse = Stats::of(ordered.iter().filter_map(|r| r.pulse));

        let category = self.category(&ordered, systolic.as_ref(), diastolic.as_ref());
        let trend = self.trend(&ordered);
        let alerts = self.alerts(&ordered, pulse.as_ref().map(|p| p.mean));

        debug!(
            "Summarized {} readings for range {}: {:?}, {:?}, {} alert(s)",
            ordered.len(),
            range,
            category,
            trend,
            alerts.len()
        );

        Summary {
            range: range.to_string(),
            total_readings: ordered.len(),
            avg_systolic: systolic.as_ref().map(|s| round1(s.mean)),
            min_systolic: systolic.as_ref().map(|s| s.min),
            max_systolic: systolic.as_ref().map(|s| s.max),
            avg_diastolic: diastolic.as_ref().map(|s| round1(s.mean)),
            min_diastolic: diastolic.as_ref().map(|s| s.min),
            max_diastolic: diastolic.as_ref().map(|s| s.max),
            avg_pulse: pulse.as_ref().map(|s| round1(s.mean)),
            min_pulse: pulse.as_ref().map(|s| s.min),
            max_pulse: pulse.as_ref().map(|s| s.max),
            category,
            trend: Some(trend),
            suggestion: category.map(|c| c.suggestion().to_string()),
            alerts,
        }
    }

    fn category(
        &self,
        ordered: &[&Reading],
        systolic: Option<&Stats>,
        diastolic: Option<&Stats>,
    ) -> Option<BpCategory> {
        match self.config.category_basis {
            CategoryBasis::Worst => ordered.iter().map(|r| r.category()).max(),
            CategoryBasis::Latest => ordered.last().map(|r| r.category()),
            CategoryBasis::Average => match (systolic, diastolic) {
                (Some(s), Some(d)) => Some(classify_mean(s.mean, d.mean)),
                _ => None,
            },
        }
    }

    /// Compare mean systolic of the later half of the window against the earlier half.
    fn trend(&self, ordered: &[&Reading]) -> Trend {
        if ordered.len() < self.config.min_trend_readings.max(2) {
            return Trend::InsufficientData;
        }

        let half = ordered.len() / 2;
        let (first, second) = ordered.split_at(half);
        let mean = |part: &[&Reading]| {
            part.iter().map(|r| f64::from(r.systolic)).sum::<f64>() / part.len() as f64
        };

        let diff = mean(second) - mean(first);
        if diff > self.config.trend_threshold {
            Trend::Increasing
        } else if diff < -self.config.trend_threshold {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    fn alerts(&self, ordered: &[&Reading], avg_pulse: Option<f64>) -> Vec<String> {
        let mut alerts = Vec::new();

        let hypertensive = ordered
            .iter()
            .filter(|r| r.systolic >= STAGE2_SYSTOLIC || r.diastolic >= STAGE2_DIASTOLIC)
            .count();
        if hypertensive > 0 {
            alerts.push(format!(
                "{} reading(s) in hypertensive range detected",
                hypertensive
            ));
        }

        let crisis = ordered
            .iter()
            .filter(|r| r.systolic > CRISIS_SYSTOLIC || r.diastolic > CRISIS_DIASTOLIC)
            .count();
        if crisis > 0 {
            alerts.push(format!(
                "⚠️ {} reading(s) in hypertensive crisis range!",
                crisis
            ));
        }

        if let Some(pulse) = avg_pulse {
            if pulse > self.config.high_pulse {
                alerts.push(format!(
                    "Average heart rate is elevated ({} bpm)",
                    pulse.round()
                ));
            } else if pulse < self.config.low_pulse {
                alerts.push(format!("Average heart rate is low ({} bpm)", pulse.round()));
            }
        }

        alerts
    }
}

/// Summarize with default settings.
pub fn summarize(range: &str, readings: &[Reading]) -> Summary {
    SummaryAggregator::default().summarize(range, readings)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn reading(hours: i64, sys: u32, dia: u32, pulse: Option<u32>) -> Reading {
        Reading::new(sys, dia, base() + Duration::hours(hours)).with_pulse(pulse)
    }

    fn with_basis(basis: CategoryBasis) -> SummaryAggregator {
        SummaryAggregator::new(SummaryConfig {
            category_basis: basis,
            ..SummaryConfig::default()
        })
    }

    #[test]
    fn test_empty() {
        let summary = summarize("1w", &[]);
        assert_eq!(summary.total_readings, 0);
        assert!(summary.is_empty());
        assert!(summary.avg_systolic.is_none());
        assert!(summary.avg_pulse.is_none());
        assert!(summary.category.is_none());
        assert!(summary.trend.is_none());
        assert!(summary.suggestion.is_none());
        assert!(summary.alerts.is_empty());
    }

    #[test]
    fn test_two_readings_worst_basis() {
        let readings = vec![reading(0, 120, 80, None), reading(1, 140, 95, None)];
        let summary = summarize("1w", &readings);

        assert_eq!(summary.total_readings, 2);
        assert_eq!(summary.avg_systolic, Some(130.0));
        assert_eq!(summary.avg_diastolic, Some(87.5));
        assert_eq!(summary.min_systolic, Some(120));
        assert_eq!(summary.max_diastolic, Some(95));
        assert_eq!(summary.category, Some(BpCategory::HighStage2));
        assert_eq!(
            summary.suggestion.as_deref(),
            Some(BpCategory::HighStage2.suggestion())
        );
    }

    #[test]
    fn test_category_basis_variants() {
        // Worst reading first in time, so latest and worst disagree
        let readings = vec![reading(0, 150, 95, None), reading(1, 118, 76, None)];

        assert_eq!(
            with_basis(CategoryBasis::Worst).summarize("1w", &readings).category,
            Some(BpCategory::HighStage2)
        );
        assert_eq!(
            with_basis(CategoryBasis::Latest).summarize("1w", &readings).category,
            Some(BpCategory::Normal)
        );
        // Mean 134/85.5
        assert_eq!(
            with_basis(CategoryBasis::Average).summarize("1w", &readings).category,
            Some(BpCategory::HighStage1)
        );
    }

    #[test]
    fn test_latest_uses_time_order_not_input_order() {
        let readings = vec![reading(5, 118, 76, None), reading(0, 150, 95, None)];
        let summary = with_basis(CategoryBasis::Latest).summarize("1w", &readings);
        assert_eq!(summary.category, Some(BpCategory::Normal));
    }

    #[test]
    fn test_pulse_ignores_missing() {
        let readings = vec![
            reading(0, 120, 80, Some(70)),
            reading(1, 122, 78, None),
            reading(2, 118, 76, Some(75)),
        ];
        let summary = summarize("1w", &readings);
        assert_eq!(summary.avg_pulse, Some(72.5));
        assert_eq!(summary.min_pulse, Some(70));
        assert_eq!(summary.max_pulse, Some(75));
    }

    #[test]
    fn test_all_pulse_missing() {
        let readings = vec![reading(0, 120, 80, None), reading(1, 122, 78, None)];
        let summary = summarize("1w", &readings);
        assert!(summary.avg_pulse.is_none());
        assert!(summary.min_pulse.is_none());
        assert!(summary.max_pulse.is_none());
        assert!(summary.alerts.is_empty());
    }

    #[test]
    fn test_trend() {
        let rising = vec![
            reading(0, 120, 80, None),
            reading(1, 122, 80, None),
            reading(2, 135, 80, None),
            reading(3, 140, 80, None),
        ];
        assert_eq!(summarize("1w", &rising).trend, Some(Trend::Increasing));

        let falling: Vec<Reading> = vec![
            reading(0, 150, 90, None),
            reading(1, 140, 90, None),
            reading(2, 128, 80, None),
        ];
        assert_eq!(summarize("1w", &falling).trend, Some(Trend::Decreasing));

        let flat = vec![
            reading(0, 120, 80, None),
            reading(1, 123, 80, None),
            reading(2, 121, 80, None),
        ];
        assert_eq!(summarize("1w", &flat).trend, Some(Trend::Stable));

        let short = vec![reading(0, 120, 80, None), reading(1, 160, 80, None)];
        assert_eq!(summarize("1w", &short).trend, Some(Trend::InsufficientData));
    }

    #[test]
    fn test_alerts() {
        let readings = vec![
            reading(0, 145, 85, Some(110)),
            reading(1, 190, 100, Some(105)),
            reading(2, 118, 76, Some(101)),
        ];
        let summary = summarize("1w", &readings);

        assert_eq!(summary.alerts.len(), 3);
        assert_eq!(summary.alerts[0], "2 reading(s) in hypertensive range detected");
        assert_eq!(summary.alerts[1], "⚠️ 1 reading(s) in hypertensive crisis range!");
        assert_eq!(summary.alerts[2], "Average heart rate is elevated (105 bpm)");
        assert_eq!(summary.category, Some(BpCategory::HypertensiveCrisis));
    }

    #[test]
    fn test_low_pulse_alert() {
        let readings = vec![reading(0, 115, 75, Some(45)), reading(1, 112, 72, Some(48))];
        let summary = summarize("1w", &readings);
        assert_eq!(summary.alerts, vec!["Average heart rate is low (47 bpm)"]);
    }

    #[test]
    fn test_rounding() {
        let readings = vec![
            reading(0, 120, 80, None),
            reading(1, 121, 80, None),
            reading(2, 121, 81, None),
        ];
        let summary = summarize("3d", &readings);
        assert_eq!(summary.avg_systolic, Some(120.7));
        assert_eq!(summary.avg_diastolic, Some(80.3));
        assert_eq!(summary.range, "3d");
    }
}
