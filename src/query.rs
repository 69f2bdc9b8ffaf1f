use crate::{DeviceFilter, Metric, Reading, Window};
use chrono::{DateTime, Utc};

/// A typed request for raw readings, handed to a [`crate::ReadingStore`].
///
/// The store owns translating it into its own query language;
/// arguments are validated before a `ReadingQuery` can be built by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingQuery {
    /// Metric columns to populate
    pub metrics: Vec<Metric>,

    /// Device restriction
    pub device: DeviceFilter,

    /// Lookback duration
    pub window: Window,

    /// Reference instant the window ends at
    pub now: DateTime<Utc>,
}

impl ReadingQuery {
    /// Earliest timestamp a returned reading may have.
    #[must_use]
    pub fn since(&self) -> DateTime<Utc> {
        self.window.start(self.now)
    }

    /// Returns `true` if the reading falls inside the query's device filter and window.
    ///
    /// Both ends of the window are inclusive.
    #[must_use]
    pub fn matches(&self, reading: &Reading) -> bool {
        (self.since()..=self.now).contains(&reading.timestamp)
            && self.device.matches(&reading.device_id)
    }
}

impl std::fmt::Display for ReadingQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let metrics = self
            .metrics
            .iter()
            .copied()
            .map(Metric::as_str)
            .collect::<Vec<_>>()
            .join(",");

        write!(
            f,
            "{metrics}{{device:{}}} [{}..={}]",
            self.device,
            crate::time::format_instant(self.since()),
            crate::time::format_instant(self.now),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn matches_window_and_device() -> crate::Result<()> {
        let query = ReadingQuery {
            metrics: vec![Metric::Pm25],
            device: DeviceFilter::parse(Some("Station-01"))?,
            window: Window::hours(1)?,
            now: "2024-01-01T12:00:00Z".parse().unwrap(),
        };

        let inside = Reading::new("Station-01", "2024-01-01T11:00:00Z".parse().unwrap());
        let too_old = Reading::new("Station-01", "2024-01-01T10:59:59Z".parse().unwrap());
        let at_end = Reading::new("Station-01", "2024-01-01T12:00:00Z".parse().unwrap());
        let too_new = Reading::new("Station-01", "2024-01-01T12:00:00.000001Z".parse().unwrap());
        let other = Reading::new("Station-02", "2024-01-01T11:30:00Z".parse().unwrap());

        assert!(query.matches(&inside));
        assert!(query.matches(&at_end));
        assert!(!query.matches(&too_old));
        assert!(!query.matches(&too_new));
        assert!(!query.matches(&other));

        assert_eq!(
            "pm25{device:Station-01} [2024-01-01T11:00:00.000Z..=2024-01-01T12:00:00.000Z]",
            query.to_string()
        );

        Ok(())
    }
}
