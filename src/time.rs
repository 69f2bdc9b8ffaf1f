use chrono::{DateTime, SecondsFormat, Utc};

const SECONDS_PER_HOUR: i64 = 3_600;

/// Returns the current instant.
///
/// Only read at the request boundary; everything below takes the
/// reference instant as an argument.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Truncates an instant down to the start of its UTC hour.
#[must_use]
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();

    // NOTE: The hour boundary of a representable instant is representable
    DateTime::from_timestamp(secs - secs.rem_euclid(SECONDS_PER_HOUR), 0).unwrap_or(ts)
}

/// Formats an hour bucket start, e.g. `2024-01-01T10:00:00Z`.
#[must_use]
pub fn format_hour(ts: DateTime<Utc>) -> String {
    truncate_to_hour(ts).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a full-precision instant, e.g. `2024-01-01T10:15:42.123Z`.
#[must_use]
pub fn format_instant(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_log::test;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn truncate_discards_minutes_and_below() {
        assert_eq!(
            ts("2024-01-01T10:00:00Z"),
            truncate_to_hour(ts("2024-01-01T10:59:59.999999Z"))
        );
        assert_eq!(
            ts("2024-01-01T10:00:00Z"),
            truncate_to_hour(ts("2024-01-01T10:00:00Z"))
        );
    }

    #[test]
    fn truncate_before_epoch() {
        assert_eq!(
            ts("1969-12-31T23:00:00Z"),
            truncate_to_hour(ts("1969-12-31T23:30:00Z"))
        );
    }

    #[test]
    fn hour_format() {
        assert_eq!(
            "2024-01-01T10:00:00Z",
            format_hour(ts("2024-01-01T10:45:12Z"))
        );
    }

    #[test]
    fn instant_format() {
        assert_eq!(
            "2024-01-01T10:45:12.500Z",
            format_instant(ts("2024-01-01T10:45:12.5Z"))
        );
    }
}
