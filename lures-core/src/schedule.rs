//! Daily-boundary timing: the report refreshes at the next local midnight
//! and every 24 hours after that.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

/// Cadence between daily refreshes once the first boundary has fired.
pub const DAILY_PERIOD: Duration = Duration::from_secs(24 * 3600);

/// The next midnight after `now` in its own timezone, or `None` on
/// calendar edges (end of representable time, a midnight skipped by a
/// DST transition).
pub fn next_daily_boundary<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    now.date_naive()
        .succ_opt()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(now.timezone()).earliest())
}

/// Time to wait from `now` until the next midnight; falls back to a full
/// day when the boundary cannot be computed.
pub fn until_next_daily_boundary<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    next_daily_boundary(now)
        .and_then(|boundary| (boundary - now.clone()).to_std().ok())
        .unwrap_or(DAILY_PERIOD)
}

/// Suspend until the next local midnight.
pub async fn sleep_until_daily_boundary() {
    let wait = until_next_daily_boundary(&Local::now());
    tracing::info!(seconds = wait.as_secs(), "sleeping until next local midnight");
    tokio::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).expect("valid timestamp")
    }

    #[test]
    fn boundary_is_next_midnight() {
        let now = at("2025-06-02T22:30:00-05:00");
        let boundary = next_daily_boundary(&now).expect("boundary");
        assert_eq!(boundary, at("2025-06-03T00:00:00-05:00"));
    }

    #[test]
    fn boundary_at_midnight_is_a_full_day_out() {
        let now = at("2025-06-02T00:00:00-05:00");
        let boundary = next_daily_boundary(&now).expect("boundary");
        assert_eq!(boundary, at("2025-06-03T00:00:00-05:00"));
    }

    #[test]
    fn wait_time_matches_clock_distance() {
        let now = at("2025-06-02T22:30:00-05:00");
        assert_eq!(until_next_daily_boundary(&now), Duration::from_secs(90 * 60));
    }
}
