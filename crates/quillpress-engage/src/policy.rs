//! Engagement staleness policies.
//!
//! Two temporal policies exist and are explicit configuration — an
//! implementation never blends day-boundary and rolling-window
//! semantics. Views use whichever window is configured; likes toggle and
//! have no decay.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

/// When an existing engagement record stops suppressing a new count.
#[derive(Debug, Clone)]
pub enum DedupWindow {
    /// Records older than the most recent local midnight in `timezone`
    /// are stale. Two views two minutes apart count twice when midnight
    /// falls between them.
    DailyReset { timezone: Tz },
    /// Records older than a fixed duration are stale, independent of
    /// calendar boundaries.
    Rolling { window: Duration },
}

impl DedupWindow {
    pub fn daily(timezone: Tz) -> Self {
        DedupWindow::DailyReset { timezone }
    }

    pub fn rolling_24h() -> Self {
        DedupWindow::Rolling {
            window: Duration::hours(24),
        }
    }

    /// The cutoff instant: records with `recorded_at` strictly before it
    /// are stale at `now`.
    pub fn stale_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DedupWindow::DailyReset { timezone } => {
                let local = now.with_timezone(timezone);
                let midnight = local
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or(local.naive_local());
                match timezone.from_local_datetime(&midnight).earliest() {
                    Some(local_midnight) => local_midnight.with_timezone(&Utc),
                    // Midnight skipped by a DST transition: fall back to
                    // a rolling day.
                    None => now - Duration::hours(24),
                }
            }
            DedupWindow::Rolling { window } => now - *window,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn daily_reset_cutoff_is_local_midnight() {
        let window = DedupWindow::daily(chrono_tz::UTC);
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 1, 0).unwrap();
        let cutoff = window.stale_before(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn day_boundary_staleness_two_minutes_apart() {
        // A record from 23:59 is stale at 00:01 the next day even though
        // the wall-clock delta is two minutes.
        let window = DedupWindow::daily(chrono_tz::UTC);
        let recorded_at = Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 1, 0).unwrap();
        assert!(recorded_at < window.stale_before(now));
    }

    #[test]
    fn same_day_record_is_fresh() {
        let window = DedupWindow::daily(chrono_tz::UTC);
        let recorded_at = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 21, 0, 0).unwrap();
        assert!(recorded_at >= window.stale_before(now));
    }

    #[test]
    fn daily_reset_respects_configured_timezone() {
        // 03:00 UTC is 23:00 of the previous day in New York, so the
        // cutoff is the previous New York midnight (04:00 UTC the day
        // before, EDT).
        let window = DedupWindow::daily(chrono_tz::America::New_York);
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 3, 0, 0).unwrap();
        let cutoff = window.stale_before(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 6, 14, 4, 0, 0).unwrap());
    }

    #[test]
    fn rolling_window_ignores_calendar_days() {
        let window = DedupWindow::rolling_24h();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 1, 0).unwrap();
        let cutoff = window.stale_before(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 6, 14, 0, 1, 0).unwrap());

        // The 23:59 record survives a midnight crossing under the
        // rolling policy.
        let recorded_at = Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 0).unwrap();
        assert!(recorded_at >= cutoff);
    }
}
