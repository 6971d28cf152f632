//! Named and custom time windows.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};

/// A time window used to filter and aggregate readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    /// Since local midnight
    Today,
    /// The last `n` days
    Days(u32),
    /// The last `n` weeks
    Weeks(u32),
    /// The last `n` calendar months
    Months(u32),
    /// Everything
    All,
    /// Explicit bounds, inclusive
    Custom {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Weeks(1)
    }
}

impl TimeRange {
    /// Labels offered by the range picker.
    pub const PRESETS: [(&'static str, &'static str); 7] = [
        ("today", "Today"),
        ("1w", "Last 7 Days"),
        ("2w", "Last 14 Days"),
        ("1m", "Last 30 Days"),
        ("3m", "Last 3 Months"),
        ("6m", "Last 6 Months"),
        ("all", "All Time"),
    ];

    /// Parse a label, falling back to one week for anything unrecognised.
    pub fn parse_lenient(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            warn!("Unknown range {:?}, using 1w", label);
            TimeRange::default()
        })
    }

    /// Lower bound relative to `now`; `None` means unbounded.
    ///
    /// Windows reaching past the earliest representable instant start there.
    pub fn since(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let earliest = match *self {
            TimeRange::Today => return now.date().and_hms_opt(0, 0, 0),
            TimeRange::Days(n) => {
                Duration::try_days(i64::from(n)).and_then(|d| now.checked_sub_signed(d))
            }
            TimeRange::Weeks(n) => {
                Duration::try_weeks(i64::from(n)).and_then(|d| now.checked_sub_signed(d))
            }
            TimeRange::Months(n) => now.checked_sub_months(Months::new(n)),
            TimeRange::All => return None,
            TimeRange::Custom { start, .. } => return Some(start),
        };
        Some(earliest.unwrap_or(NaiveDateTime::MIN))
    }

    /// Upper bound; only custom ranges have one.
    pub fn until(&self) -> Option<NaiveDateTime> {
        match *self {
            TimeRange::Custom { end, .. } => Some(end),
            _ => None,
        }
    }

    /// Whether `at` falls inside the window evaluated at `now`.
    pub fn contains(&self, now: NaiveDateTime, at: NaiveDateTime) -> bool {
        let after_start = self.since(now).map_or(true, |since| at >= since);
        let before_end = self.until().map_or(true, |until| at <= until);
        after_start && before_end
    }

    /// Short label, e.g. "1w".
    pub fn label(&self) -> String {
        match *self {
            TimeRange::Today => "today".into(),
            TimeRange::Days(n) => format!("{}d", n),
            TimeRange::Weeks(n) => format!("{}w", n),
            TimeRange::Months(n) => format!("{}m", n),
            TimeRange::All => "all".into(),
            TimeRange::Custom { start, end } => format!(
                "{}..{}",
                start.format("%Y-%m-%dT%H:%M:%S"),
                end.format("%Y-%m-%dT%H:%M:%S")
            ),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    /// Accepts `today`, `all`, `<n>d`, `<n>w`, `<n>m`, or `<start>..<end>`
    /// with local timestamps or whole days (`2024-05-01..2024-05-10`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((start, end)) = trimmed.split_once("..") {
            let start = parse_bound(start, false)
                .ok_or_else(|| format!("invalid range start: {}", start))?;
            let end = parse_bound(end, true)
                .ok_or_else(|| format!("invalid range end: {}", end))?;
            if end < start {
                return Err(format!("range end {} is before start {}", end, start));
            }
            return Ok(TimeRange::Custom { start, end });
        }

        let s = trimmed.to_lowercase();
        match s.as_str() {
            "today" => return Ok(TimeRange::Today),
            "all" => return Ok(TimeRange::All),
            _ => {}
        }

        let unit = s.chars().last().ok_or_else(|| "empty range".to_string())?;
        let count: u32 = s[..s.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| format!("invalid range: {}", s))?;
        if count == 0 {
            return Err(format!("range must be positive: {}", s));
        }

        match unit {
            'd' => Ok(TimeRange::Days(count)),
            'w' => Ok(TimeRange::Weeks(count)),
            'm' => Ok(TimeRange::Months(count)),
            _ => Err(format!("invalid range unit: {}", s)),
        }
    }
}

/// A custom range bound. A bare date covers the whole day.
fn parse_bound(raw: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) if end_of_day => date.and_hms_opt(23, 59, 59),
        Ok(date) => date.and_hms_opt(0, 0, 0),
        Err(_) => crate::models::parse_local_timestamp(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 31)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap()
    }

    fn day(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("today".parse::<TimeRange>().unwrap(), TimeRange::Today);
        assert_eq!("1D".parse::<TimeRange>().unwrap(), TimeRange::Days(1));
        assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Days(7));
        assert_eq!("2w".parse::<TimeRange>().unwrap(), TimeRange::Weeks(2));
        assert_eq!("3m".parse::<TimeRange>().unwrap(), TimeRange::Months(3));
        assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert!("0d".parse::<TimeRange>().is_err());
        assert!("xyz".parse::<TimeRange>().is_err());
        assert!("".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_parse_lenient_fallback() {
        assert_eq!(TimeRange::parse_lenient("bogus"), TimeRange::Weeks(1));
        assert_eq!(TimeRange::parse_lenient("3d"), TimeRange::Days(3));
    }

    #[test]
    fn test_custom_range() {
        let range: TimeRange = "2024-05-01T00:00..2024-05-10T23:59".parse().unwrap();
        assert_eq!(range.since(now()), Some(day(5, 1, 0)));
        assert!(range.contains(now(), day(5, 5, 12)));
        assert!(!range.contains(now(), day(5, 11, 0)));

        assert!("2024-05-10T00:00..2024-05-01T00:00"
            .parse::<TimeRange>()
            .is_err());
    }

    #[test]
    fn test_date_only_custom_range() {
        let range: TimeRange = "2024-05-01..2024-05-10".parse().unwrap();
        assert_eq!(range.since(now()), Some(day(5, 1, 0)));
        assert_eq!(
            range.until(),
            NaiveDate::from_ymd_opt(2024, 5, 10)
                .unwrap()
                .and_hms_opt(23, 59, 59)
        );
        assert!(range.contains(now(), day(5, 10, 22)));
        assert!(!range.contains(now(), day(5, 11, 0)));

        let same_day = TimeRange::parse_lenient("2024-05-01..2024-05-01");
        assert!(same_day.contains(now(), day(5, 1, 0)));
        assert!(same_day.contains(now(), day(5, 1, 23)));
        assert!(!same_day.contains(now(), day(4, 30, 23)));
        assert!(!same_day.contains(now(), day(5, 2, 0)));

        let mixed: TimeRange = "2024-05-01..2024-05-02T12:00".parse().unwrap();
        assert_eq!(mixed.until(), Some(day(5, 2, 12)));

        assert!("2024-05-10..2024-05-01".parse::<TimeRange>().is_err());
        assert!("2024-13-01..2024-05-01".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_huge_counts_start_at_earliest_instant() {
        let days: TimeRange = "100000000d".parse().unwrap();
        assert_eq!(days.since(now()), Some(NaiveDateTime::MIN));
        assert_eq!(TimeRange::Weeks(u32::MAX).since(now()), Some(NaiveDateTime::MIN));

        let months: TimeRange = "4294967295m".parse().unwrap();
        assert_eq!(months.since(now()), Some(NaiveDateTime::MIN));
        assert!(months.contains(now(), day(1, 1, 0)));
    }

    #[test]
    fn test_since() {
        assert_eq!(TimeRange::Today.since(now()), Some(day(5, 31, 0)));
        assert_eq!(
            TimeRange::Weeks(1).since(now()),
            Some(now() - Duration::days(7))
        );
        // Month arithmetic clamps to the end of shorter months
        assert_eq!(
            TimeRange::Months(3).since(now()),
            NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_opt(18, 30, 0)
        );
        assert_eq!(TimeRange::All.since(now()), None);
    }

    #[test]
    fn test_contains() {
        assert!(TimeRange::Today.contains(now(), day(5, 31, 7)));
        assert!(!TimeRange::Today.contains(now(), day(5, 30, 23)));
        assert!(TimeRange::All.contains(now(), day(1, 1, 0)));
    }

    #[test]
    fn test_label_round_trip() {
        for range in [
            TimeRange::Today,
            TimeRange::Days(3),
            TimeRange::Weeks(2),
            TimeRange::Months(6),
            TimeRange::All,
            "2024-05-01..2024-05-10".parse().unwrap(),
        ] {
            assert_eq!(range.label().parse::<TimeRange>().unwrap(), range);
        }
    }

    #[test]
    fn test_presets_parse() {
        for (label, _) in TimeRange::PRESETS {
            assert!(label.parse::<TimeRange>().is_ok(), "{}", label);
        }
    }
}
