//! Quiet-hours window evaluation.
//!
//! A user's notification preference may carry a quiet-hours window as local
//! `"HH:MM"` start/end strings plus an IANA timezone name. During the window
//! the push channel is suppressed; email is unaffected. Windows may cross
//! midnight (`22:00`–`07:00`).

use chrono::{NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::types::Timestamp;

/// A quiet-hours window in the user's local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuietHours {
    start: NaiveTime,
    end: NaiveTime,
    tz: Tz,
}

impl QuietHours {
    /// Build a window from preference fields.
    ///
    /// Returns `None` when either bound is missing or unparseable, or the
    /// timezone name is unknown; callers treat that as "no quiet hours".
    /// A window with equal bounds is also `None` (zero-length).
    pub fn from_preference(start: Option<&str>, end: Option<&str>, timezone: &str) -> Option<Self> {
        let start = NaiveTime::parse_from_str(start?, "%H:%M").ok()?;
        let end = NaiveTime::parse_from_str(end?, "%H:%M").ok()?;
        if start == end {
            return None;
        }
        let tz: Tz = timezone.parse().ok()?;
        Some(Self { start, end, tz })
    }

    /// Whether `instant` falls inside the window, evaluated in the user's
    /// timezone. The start bound is inclusive, the end bound exclusive.
    pub fn contains(&self, instant: Timestamp) -> bool {
        let local = instant.with_timezone(&self.tz).time();
        // Compare on whole minutes; preferences carry minute precision.
        let local = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0)
            .expect("valid truncated time");
        if self.start < self.end {
            self.start <= local && local < self.end
        } else {
            // Window crosses midnight.
            local >= self.start || local < self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window(start: &str, end: &str, tz: &str) -> QuietHours {
        QuietHours::from_preference(Some(start), Some(end), tz).unwrap()
    }

    #[test]
    fn missing_bounds_mean_no_window() {
        assert!(QuietHours::from_preference(None, Some("07:00"), "UTC").is_none());
        assert!(QuietHours::from_preference(Some("22:00"), None, "UTC").is_none());
    }

    #[test]
    fn unknown_timezone_means_no_window() {
        assert!(QuietHours::from_preference(Some("22:00"), Some("07:00"), "Mars/Olympus").is_none());
    }

    #[test]
    fn zero_length_window_means_no_window() {
        assert!(QuietHours::from_preference(Some("08:00"), Some("08:00"), "UTC").is_none());
    }

    #[test]
    fn same_day_window() {
        let w = window("13:00", "15:00", "UTC");
        let inside = Utc.with_ymd_and_hms(2026, 3, 1, 14, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2026, 3, 1, 12, 59, 0).unwrap();
        let at_end = Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap();
        assert!(w.contains(inside));
        assert!(!w.contains(before));
        assert!(!w.contains(at_end));
    }

    #[test]
    fn midnight_crossing_window() {
        let w = window("22:00", "07:00", "UTC");
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 23, 30, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 3, 2, 6, 59, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert!(w.contains(late));
        assert!(w.contains(early));
        assert!(!w.contains(noon));
    }

    #[test]
    fn evaluated_in_the_users_timezone() {
        // 03:00 UTC is 22:00 the previous evening in New York (EST, UTC-5).
        let w = window("21:00", "23:00", "America/New_York");
        let instant = Utc.with_ymd_and_hms(2026, 1, 15, 3, 0, 0).unwrap();
        assert!(w.contains(instant));
        assert!(!window("21:00", "23:00", "UTC").contains(instant));
    }
}
