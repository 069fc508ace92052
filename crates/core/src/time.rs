use chrono::{DateTime, Datelike, Timelike, Utc};

/// Minute-granularity time bucket in `yyyyMMddHHmm` integer form, UTC.
///
/// Out-of-range timestamps collapse to bucket 0 rather than failing; clock
/// sanity is a concern of the upstream decoder, not this core.
pub fn minute_bucket(epoch_ms: i64) -> i64 {
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(epoch_ms) else {
        return 0;
    };

    dt.year() as i64 * 100_000_000
        + dt.month() as i64 * 1_000_000
        + dt.day() as i64 * 10_000
        + dt.hour() as i64 * 100
        + dt.minute() as i64
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn buckets_to_the_minute() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 1, 9, 41, 27).unwrap();
        assert_eq!(minute_bucket(ts.timestamp_millis()), 202602010941);
    }

    #[test]
    fn seconds_within_a_minute_share_a_bucket() {
        let base = Utc.with_ymd_and_hms(2026, 2, 1, 9, 41, 0).unwrap();
        let a = minute_bucket(base.timestamp_millis());
        let b = minute_bucket(base.timestamp_millis() + 59_999);
        assert_eq!(a, b);
        assert_ne!(a, minute_bucket(base.timestamp_millis() + 60_000));
    }

    #[test]
    fn out_of_range_collapses_to_zero() {
        assert_eq!(minute_bucket(i64::MAX), 0);
    }
}
