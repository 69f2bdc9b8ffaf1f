//! Response shapes handed to the dashboard frontend.
//!
//! All rounding happens here: 1 decimal for statistics, 3 for correlation coefficients.
//! Absent statistics are left out of the serialized output.

use crate::agg::{BucketStats, LatestStats, WindowStats};
use crate::correlate::{Correlation, PairedBucket, Strength};
use crate::{time, DeviceFilter, Metric, Reading};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Rounds half away from zero to `decimals` places.
///
/// Idempotent: rounding an already rounded value returns it unchanged.
///
/// ```
/// use airsense::format::round;
///
/// assert_eq!(45.2, round(45.16, 1));
/// assert_eq!(-0.3, round(-0.25, 1));
/// assert_eq!(0.667, round(2.0 / 3.0, 3));
/// ```
#[must_use]
pub fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    let scaled = value * factor;

    if !scaled.is_finite() {
        return value;
    }

    // NOTE: + 0.0 turns -0.0 into 0.0
    scaled.round() / factor + 0.0
}

fn round1(value: Option<f64>) -> Option<f64> {
    value.map(|v| round(v, 1))
}

/// Request echo carried by every response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Echo {
    /// Window, e.g. `24 hours` or the caller's label such as `7d`; absent for window-less requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,

    /// `all` or the filtered device
    pub device_filter: String,

    /// Reference instant of the request
    pub generated_at: String,
}

impl Echo {
    /// Builds the echo of a request.
    #[must_use]
    pub fn new(period: Option<&str>, device: &DeviceFilter, now: DateTime<Utc>) -> Self {
        Self {
            period: period.map(str::to_owned),
            device_filter: device.to_string(),
            generated_at: time::format_instant(now),
        }
    }
}

/// One hour of a single-metric series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BucketRow {
    /// Start of the hour
    pub timestamp: String,

    /// Mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    /// Minimum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Maximum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Non-null values in the hour
    pub count: usize,

    /// Devices that reported in the hour
    pub device_count: usize,
}

impl BucketRow {
    /// Shapes the statistics of the hour starting at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>, stats: &BucketStats) -> Self {
        Self {
            timestamp: time::format_hour(start),
            mean: round1(stats.mean),
            min: round1(stats.min),
            max: round1(stats.max),
            count: stats.count,
            device_count: stats.device_count,
        }
    }
}

/// Hourly series of one metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateResponse {
    /// Aggregated metric
    pub data_type: Metric,

    /// Hours with at least one reading, ascending
    pub buckets: Vec<BucketRow>,

    /// Request echo
    #[serde(flatten)]
    pub echo: Echo,
}

/// Whole-window statistics of one metric.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatisticsRow {
    /// Non-null values in the window
    pub total_readings: usize,

    /// Mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    /// Minimum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Maximum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Population standard deviation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,

    /// Median
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,

    /// 95th percentile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
}

impl From<&WindowStats> for StatisticsRow {
    fn from(stats: &WindowStats) -> Self {
        Self {
            total_readings: stats.total_readings,
            mean: round1(stats.mean),
            min: round1(stats.min),
            max: round1(stats.max),
            stddev: round1(stats.stddev),
            median: round1(stats.median),
            p95: round1(stats.p95),
        }
    }
}

/// Mean and volume of one hour.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendRow {
    /// Start of the hour
    pub hour: String,

    /// Mean
    pub mean: f64,

    /// Non-null values in the hour
    pub count: usize,
}

impl TrendRow {
    /// Shapes an hour's statistics; `None` if the metric was never reported.
    #[must_use]
    pub fn new(start: DateTime<Utc>, stats: &BucketStats) -> Option<Self> {
        Some(Self {
            hour: time::format_hour(start),
            mean: round(stats.mean?, 1),
            count: stats.count,
        })
    }
}

/// Whole-window statistics plus the most recent hourly trend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WindowResponse {
    /// Summarized metric
    pub data_type: Metric,

    /// Statistics over the whole window
    pub statistics: StatisticsRow,

    /// Up to 24 most recent hours, ascending
    pub trends: Vec<TrendRow>,

    /// Request echo
    #[serde(flatten)]
    pub echo: Echo,
}

/// One hour of a multi-metric series.
///
/// Metric means are keyed by metric name; unreported metrics are left out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesRow {
    /// Start of the hour
    pub timestamp: String,

    /// Mean per metric
    #[serde(flatten)]
    pub values: BTreeMap<&'static str, f64>,

    /// Devices that reported in the hour
    pub device_count: usize,
}

impl SeriesRow {
    /// Shapes an hour of metric means.
    pub fn new(
        start: DateTime<Utc>,
        means: impl IntoIterator<Item = (Metric, Option<f64>)>,
        device_count: usize,
    ) -> Self {
        Self {
            timestamp: time::format_hour(start),
            values: means
                .into_iter()
                .filter_map(|(metric, mean)| Some((metric.as_str(), round(mean?, 1))))
                .collect(),
            device_count,
        }
    }

    fn paired(bucket: &PairedBucket, a: Metric, b: Metric) -> Self {
        Self::new(bucket.start, [(a, bucket.a), (b, bucket.b)], bucket.device_count)
    }
}

/// Two metrics compared hour by hour.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrelationResponse {
    /// First metric
    pub metric_a: Metric,

    /// Second metric
    pub metric_b: Metric,

    /// Hours where at least one of the metrics was reported, ascending
    pub buckets: Vec<SeriesRow>,

    /// Pearson coefficient, 3 decimals
    pub coefficient: f64,

    /// Label of the coefficient
    pub strength: Strength,

    /// Request echo
    #[serde(flatten)]
    pub echo: Echo,
}

impl CorrelationResponse {
    /// Shapes a computed correlation.
    #[must_use]
    pub fn new(correlation: &Correlation, echo: Echo) -> Self {
        Self {
            metric_a: correlation.a,
            metric_b: correlation.b,
            buckets: correlation
                .buckets
                .iter()
                .map(|bucket| SeriesRow::paired(bucket, correlation.a, correlation.b))
                .collect(),
            coefficient: round(correlation.coefficient, 3),
            strength: correlation.strength,
            echo,
        }
    }
}

/// Hourly means of every metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoricalResponse {
    /// Hours with at least one reading, ascending
    pub buckets: Vec<SeriesRow>,

    /// Request echo
    #[serde(flatten)]
    pub echo: Echo,
}

/// Whole-window mean/min/max of one metric.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RangeRow {
    /// Mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    /// Minimum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Maximum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl From<&WindowStats> for RangeRow {
    fn from(stats: &WindowStats) -> Self {
        Self {
            mean: round1(stats.mean),
            min: round1(stats.min),
            max: round1(stats.max),
        }
    }
}

/// Whole-window summary of every metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryResponse {
    /// Readings in the window, null or not
    pub total_readings: usize,

    /// Statistics per metric name
    pub metrics: BTreeMap<&'static str, RangeRow>,

    /// Request echo
    #[serde(flatten)]
    pub echo: Echo,
}

/// One raw reading of one metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReadingRow {
    /// Reporting device
    pub device_id: String,

    /// Full-precision instant
    pub timestamp: String,

    /// Reported value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ReadingRow {
    /// Shapes one metric of a reading.
    #[must_use]
    pub fn new(reading: &Reading, metric: Metric) -> Self {
        Self {
            device_id: reading.device_id.clone(),
            timestamp: time::format_instant(reading.timestamp),
            value: reading.value(metric),
        }
    }
}

/// Statistics of the newest readings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LatestStatistics {
    /// Newest non-null value
    pub latest: f64,

    /// Mean
    pub average: f64,

    /// Minimum
    pub min: f64,

    /// Maximum
    pub max: f64,

    /// Non-null values considered
    pub count: usize,
}

/// Newest readings of one metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LatestResponse {
    /// Requested metric
    pub data_type: Metric,

    /// Newest readings first
    pub readings: Vec<ReadingRow>,

    /// Absent if none of the readings carried the metric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<LatestStatistics>,

    /// Request echo
    #[serde(flatten)]
    pub echo: Echo,
}

impl From<&LatestStats> for LatestStatistics {
    fn from(stats: &LatestStats) -> Self {
        Self {
            latest: round(stats.latest, 1),
            average: round(stats.average, 1),
            min: round(stats.min, 1),
            max: round(stats.max, 1),
            count: stats.count,
        }
    }
}
