use crate::Error;
use chrono::{DateTime, TimeDelta, Utc};
use nom::{
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map_res, opt},
    sequence::pair,
    IResult,
};

/// Longest lookback a query may use (7 days).
pub const MAX_WINDOW_HOURS: u32 = 168;

const WINDOW_REASON: &str = "must be between 1 and 168 hours (7 days)";

/// Lookback duration bounding which readings a query considers.
///
/// ```
/// use airsense::Window;
///
/// assert_eq!(24, Window::hours(24)?.as_hours());
/// assert_eq!(168, Window::parse("7d")?.as_hours());
/// assert!(Window::hours(200).is_err());
/// # Ok::<(), airsense::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
pub struct Window(u32);

impl Default for Window {
    fn default() -> Self {
        Self(24)
    }
}

impl Window {
    /// Creates a window of `n` hours.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n` is outside `1..=168`.
    pub fn hours(n: u32) -> crate::Result<Self> {
        if (1..=MAX_WINDOW_HOURS).contains(&n) {
            Ok(Self(n))
        } else {
            Err(Error::invalid("window_hours", n, WINDOW_REASON))
        }
    }

    /// Parses a period label: `6`, `6h` or `7d`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the label is malformed or out of range.
    pub fn parse(label: &str) -> crate::Result<Self> {
        let Ok((_, (n, unit))) = period(label) else {
            return Err(Error::invalid(
                "window_hours",
                label,
                "expected a period like 6h or 7d",
            ));
        };

        let hours = match unit {
            Some('d') => n.checked_mul(24),
            _ => Some(n),
        };

        match hours {
            Some(hours) if (1..=MAX_WINDOW_HOURS).contains(&hours) => Ok(Self(hours)),
            _ => Err(Error::invalid("window_hours", label, WINDOW_REASON)),
        }
    }

    /// Length of the window in hours.
    #[must_use]
    pub const fn as_hours(self) -> u32 {
        self.0
    }

    /// Earliest instant inside the window ending at `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - TimeDelta::hours(i64::from(self.0))
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} hours", self.0)
    }
}

fn period(input: &str) -> IResult<&str, (u32, Option<char>)> {
    all_consuming(pair(
        map_res(digit1, |digits: &str| digits.parse::<u32>()),
        opt(one_of("hd")),
    ))(input)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn window_bounds() {
        assert!(Window::hours(0).is_err());
        assert!(Window::hours(1).is_ok());
        assert!(Window::hours(168).is_ok());
        assert!(Window::hours(169).is_err());
    }

    #[test]
    fn window_200_is_invalid_argument() {
        let Err(Error::InvalidArgument(err)) = Window::hours(200) else {
            panic!("200 hours should be rejected");
        };
        assert_eq!("window_hours", err.argument);
        assert_eq!("200", err.value);
    }

    #[test]
    fn parse_labels() -> crate::Result<()> {
        assert_eq!(1, Window::parse("1h")?.as_hours());
        assert_eq!(6, Window::parse("6h")?.as_hours());
        assert_eq!(24, Window::parse("24h")?.as_hours());
        assert_eq!(48, Window::parse("48")?.as_hours());
        assert_eq!(168, Window::parse("7d")?.as_hours());
        Ok(())
    }

    #[test]
    fn parse_rejects_garbage_and_overflow() {
        for label in ["", "h", "24x", "24h ", "-1h", "30d", "0h", "99999999999d"] {
            assert!(Window::parse(label).is_err(), "{label:?} should be rejected");
        }
    }

    #[test]
    fn window_start() {
        let now: DateTime<Utc> = "2024-01-02T00:30:00Z".parse().unwrap();
        let start = Window::hours(24).unwrap().start(now);
        assert_eq!("2024-01-01T00:30:00Z".parse::<DateTime<Utc>>().unwrap(), start);
    }

    #[test]
    fn window_display() {
        assert_eq!("24 hours", Window::default().to_string());
    }
}
