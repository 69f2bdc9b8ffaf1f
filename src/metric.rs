use crate::Error;

/// A measured quantity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash, Debug)]
#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Fine particulate matter (µg/m³)
    Pm25,

    /// Coarse particulate matter (µg/m³)
    Pm10,

    /// Air temperature (°C)
    Temperature,

    /// Relative humidity (%)
    Humidity,
}

impl Metric {
    /// All metrics, in column order.
    pub const ALL: [Self; 4] = [Self::Pm25, Self::Pm10, Self::Temperature, Self::Humidity];

    /// The metric's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` if a sensor may report `value` for this metric.
    #[must_use]
    pub fn accepts(self, value: f64) -> bool {
        match self {
            Self::Pm25 | Self::Pm10 => value >= 0.0,
            Self::Temperature => (-50.0..=100.0).contains(&value),
            Self::Humidity => (0.0..=100.0).contains(&value),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Metric {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str() == value)
            .ok_or_else(|| {
                Error::invalid(
                    "metric",
                    value,
                    "must be one of: pm25, pm10, temperature, humidity",
                )
            })
    }
}

impl std::str::FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parse_known_metrics() -> crate::Result<()> {
        for metric in Metric::ALL {
            assert_eq!(metric, Metric::try_from(metric.as_str())?);
        }
        Ok(())
    }

    #[test]
    fn parse_unknown_metric() {
        let Err(Error::InvalidArgument(err)) = Metric::try_from("co2") else {
            panic!("co2 should be rejected");
        };
        assert_eq!("metric", err.argument);
        assert_eq!("co2", err.value);
    }

    #[test]
    fn metric_names_are_case_sensitive() {
        assert!("PM25".parse::<Metric>().is_err());
    }

    #[test]
    fn ingest_ranges() {
        assert!(Metric::Pm25.accepts(0.0));
        assert!(!Metric::Pm10.accepts(-0.1));
        assert!(Metric::Temperature.accepts(-50.0));
        assert!(!Metric::Temperature.accepts(100.5));
        assert!(!Metric::Humidity.accepts(101.0));
    }
}
