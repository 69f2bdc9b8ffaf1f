use crate::{DeviceId, Error, Metric};
use chrono::{DateTime, Utc};

/// One sensor sample.
///
/// Metric columns are nullable; a store only populates the columns a query asked for.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    /// Reporting device
    pub device_id: String,

    /// When the sample was taken
    pub timestamp: DateTime<Utc>,

    /// PM2.5 concentration
    pub pm25: Option<f64>,

    /// PM10 concentration
    pub pm10: Option<f64>,

    /// Temperature
    pub temperature: Option<f64>,

    /// Relative humidity
    pub humidity: Option<f64>,
}

impl Reading {
    /// Creates a reading without any metric values.
    pub fn new(device_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            pm25: None,
            pm10: None,
            temperature: None,
            humidity: None,
        }
    }

    /// Sets a metric value.
    #[must_use]
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        *self.slot_mut(metric) = Some(value);
        self
    }

    /// Returns the metric value, if present and finite.
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.slot(metric).filter(|v| v.is_finite())
    }

    /// Returns a copy with every metric not in `metrics` cleared.
    #[must_use]
    pub fn project(&self, metrics: &[Metric]) -> Self {
        let mut projected = Self::new(self.device_id.clone(), self.timestamp);
        for &metric in metrics {
            *projected.slot_mut(metric) = self.slot(metric);
        }
        projected
    }

    /// Checks the reading is fit for ingestion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the device identifier is malformed,
    /// or a value is outside its metric's accepted range.
    pub fn validate(&self) -> crate::Result<()> {
        DeviceId::new(&self.device_id)?;

        for metric in Metric::ALL {
            if let Some(value) = self.slot(metric) {
                if !value.is_finite() || !metric.accepts(value) {
                    return Err(Error::invalid(
                        metric.as_str(),
                        value,
                        "outside the sensor's valid range",
                    ));
                }
            }
        }

        Ok(())
    }

    pub(crate) fn slot(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pm25 => self.pm25,
            Metric::Pm10 => self.pm10,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }

    pub(crate) fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::Pm25 => &mut self.pm25,
            Metric::Pm10 => &mut self.pm10,
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
        }
    }
}
