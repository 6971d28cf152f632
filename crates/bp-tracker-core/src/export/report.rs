//! Summary report export.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::models::Summary;

/// Report format version.
pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// Summary report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Export format version
    pub format_version: String,
    /// Export timestamp
    pub exported_at: String,
    /// Range label the summary covers
    pub range: String,
}

/// A summary packaged for sharing with a clinician.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub metadata: ReportMetadata,
    pub summary: Summary,
}

impl SummaryReport {
    pub fn new(summary: Summary) -> Self {
        Self {
            metadata: ReportMetadata {
                format_version: REPORT_FORMAT_VERSION.to_string(),
                exported_at: chrono::Utc::now().to_rfc3339(),
                range: summary.range.clone(),
            },
            summary,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV: one `metric,min,avg,max` row per series, then the
    /// category, trend and each alert as `key,value` rows.
    pub fn to_csv(&self) -> String {
        let s = &self.summary;
        let mut csv = String::new();

        csv.push_str("metric,min,avg,max\n");
        for (metric, min, avg, max) in [
            ("systolic", s.min_systolic, s.avg_systolic, s.max_systolic),
            ("diastolic", s.min_diastolic, s.avg_diastolic, s.max_diastolic),
            ("pulse", s.min_pulse, s.avg_pulse, s.max_pulse),
        ] {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                metric,
                cell(min),
                cell(avg),
                cell(max)
            ));
        }

        csv.push_str(&format!("total_readings,{}\n", s.total_readings));
        if let Some(category) = s.category {
            csv.push_str(&format!("category,{}\n", escape_csv(category.label())));
        }
        if let Some(trend) = s.trend {
            csv.push_str(&format!("trend,{}\n", escape_csv(trend.label())));
        }
        for alert in &s.alerts {
            csv.push_str(&format!("alert,{}\n", escape_csv(alert)));
        }

        csv
    }
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
