//! Time-based rotation policy.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::policy::split_interval;

/// Unit of a rotation interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    /// Weeks roll on Monday 00:00 UTC.
    Weeks,
}

impl RotationUnit {
    fn from_suffix(unit: char) -> Option<Self> {
        match unit {
            's' => Some(RotationUnit::Seconds),
            'm' => Some(RotationUnit::Minutes),
            'h' => Some(RotationUnit::Hours),
            'd' => Some(RotationUnit::Days),
            'w' => Some(RotationUnit::Weeks),
            _ => None,
        }
    }

    /// strftime pattern appended to rotated file names.
    pub fn suffix_format(self) -> &'static str {
        match self {
            RotationUnit::Seconds => "%Y-%m-%d_%H-%M-%S",
            RotationUnit::Minutes => "%Y-%m-%d_%H-%M",
            RotationUnit::Hours => "%Y-%m-%d_%H",
            RotationUnit::Days | RotationUnit::Weeks => "%Y-%m-%d",
        }
    }
}

/// When the active log file is closed and a new one started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationPolicy {
    pub unit: RotationUnit,
    /// Always positive.
    pub interval: u32,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            unit: RotationUnit::Days,
            interval: 1,
        }
    }
}

impl fmt::Display for RotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} {:?}", self.interval, self.unit)
    }
}

impl RotationPolicy {
    /// Length of one rotation period, saturating at `Duration::MAX`.
    pub fn period(&self) -> Duration {
        let n = i64::from(self.interval);
        let period = match self.unit {
            RotationUnit::Seconds => Duration::try_seconds(n),
            RotationUnit::Minutes => Duration::try_minutes(n),
            RotationUnit::Hours => Duration::try_hours(n),
            RotationUnit::Days => Duration::try_days(n),
            RotationUnit::Weeks => Duration::try_weeks(n),
        };
        period.unwrap_or(Duration::MAX)
    }

    /// First rollover boundary strictly after `from`.
    ///
    /// Fixed units roll one period after `from`. Weekly rotation rolls on
    /// the next Monday midnight, then `interval - 1` further weeks.
    pub fn next_rollover(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let boundary = match self.unit {
            RotationUnit::Weeks => {
                let date = from.date_naive();
                let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                let start_of_week = Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN));
                start_of_week
                    .checked_add_signed(Duration::weeks(1))
                    .and_then(|next| {
                        Duration::try_weeks(i64::from(self.interval) - 1)
                            .and_then(|rest| next.checked_add_signed(rest))
                    })
            }
            _ => from.checked_add_signed(self.period()),
        };
        boundary.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Start of the period that ends at `boundary`, used to name the rotated file.
    pub fn period_start(&self, boundary: DateTime<Utc>) -> DateTime<Utc> {
        boundary
            .checked_sub_signed(self.period())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// strftime pattern for this policy's rotated-file suffix.
    pub fn suffix_format(&self) -> &'static str {
        self.unit.suffix_format()
    }

    /// True when `candidate` has the shape produced by `suffix_format`.
    pub fn matches_suffix(&self, candidate: &str) -> bool {
        let mut rest = candidate.as_bytes();
        let mut spec = self.suffix_format().chars();
        while let Some(c) = spec.next() {
            let width = if c == '%' {
                match spec.next() {
                    Some('Y') => 4,
                    Some(_) => 2,
                    None => return false,
                }
            } else {
                match rest.split_first() {
                    Some((&b, tail)) if b == c as u8 => {
                        rest = tail;
                        continue;
                    }
                    _ => return false,
                }
            };
            if rest.len() < width || !rest[..width].iter().all(u8::is_ascii_digit) {
                return false;
            }
            rest = &rest[width..];
        }
        rest.is_empty()
    }
}

/// Parse a raw rotation interval.
///
/// Absent, empty, or malformed input (including a zero count) yields the
/// daily default. Never fails.
pub fn parse_rotation(raw: Option<&str>) -> RotationPolicy {
    let Some(raw) = raw else {
        return RotationPolicy::default();
    };

    match split_interval(raw) {
        Some((interval, unit)) if interval > 0 => RotationUnit::from_suffix(unit)
            .map(|unit| RotationPolicy { unit, interval })
            .unwrap_or_default(),
        _ => {
            if !raw.trim().is_empty() {
                tracing::debug!(rotation = %raw, "Malformed rotation, using daily rotation");
            }
            RotationPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_valid_rotations() {
        let cases = [
            ("30s", RotationUnit::Seconds, 30),
            ("5m", RotationUnit::Minutes, 5),
            ("12h", RotationUnit::Hours, 12),
            ("7d", RotationUnit::Days, 7),
            ("2w", RotationUnit::Weeks, 2),
            (" 3D ", RotationUnit::Days, 3),
        ];
        for (raw, unit, interval) in cases {
            assert_eq!(parse_rotation(Some(raw)), RotationPolicy { unit, interval }, "{raw}");
        }
    }

    #[test]
    fn test_malformed_rotations_default_daily() {
        for raw in ["abc", "", "10x", "d10", "   ", "0d", "h"] {
            assert_eq!(parse_rotation(Some(raw)), RotationPolicy::default(), "{raw:?}");
        }
        assert_eq!(parse_rotation(None), RotationPolicy::default());
    }

    #[test]
    fn test_fixed_rollover() {
        let policy = parse_rotation(Some("12h"));
        assert_eq!(
            policy.next_rollover(at("2024-03-01T10:15:00Z")),
            at("2024-03-01T22:15:00Z")
        );
    }

    #[test]
    fn test_oversized_interval_saturates() {
        let from = at("2024-03-01T10:15:00Z");
        for unit in ["s", "m", "h", "d", "w"] {
            let policy = parse_rotation(Some(&format!("99999999999{unit}")));
            assert_eq!(policy.interval, u32::MAX, "{unit}");
            let boundary = policy.next_rollover(from);
            assert!(boundary > from, "{unit}");
            assert!(policy.period_start(boundary) <= from, "{unit}");
        }
        let daily = parse_rotation(Some("99999999999d"));
        assert_eq!(daily.next_rollover(from), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_weekly_rollover_on_monday() {
        // 2024-03-06 is a Wednesday.
        let weekly = parse_rotation(Some("1w"));
        assert_eq!(
            weekly.next_rollover(at("2024-03-06T10:00:00Z")),
            at("2024-03-11T00:00:00Z")
        );
        // Exactly on the boundary rolls to the following Monday.
        assert_eq!(
            weekly.next_rollover(at("2024-03-11T00:00:00Z")),
            at("2024-03-18T00:00:00Z")
        );

        let biweekly = parse_rotation(Some("2w"));
        assert_eq!(
            biweekly.next_rollover(at("2024-03-06T10:00:00Z")),
            at("2024-03-18T00:00:00Z")
        );
    }

    #[test]
    fn test_suffix_matching() {
        let hourly = parse_rotation(Some("1h"));
        assert!(hourly.matches_suffix("2024-03-01_10"));
        assert!(!hourly.matches_suffix("2024-03-01"));
        assert!(!hourly.matches_suffix("2024-03-01_1a"));

        let daily = RotationPolicy::default();
        assert!(daily.matches_suffix("2024-03-01"));
        assert!(!daily.matches_suffix("2024-03-01.gz"));

        let secondly = parse_rotation(Some("30s"));
        assert!(secondly.matches_suffix("2024-03-01_10-15-30"));
    }
}
