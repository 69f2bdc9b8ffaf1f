use super::{fold, percentile::interpolate, population_stddev, Avg, Max, Min};
use crate::{bucket::Bucket, Metric};

/// Statistics of one metric within one hourly bucket.
///
/// Values are unrounded; rounding happens when the response is formatted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BucketStats {
    /// Mean of non-null values
    pub mean: Option<f64>,

    /// Smallest non-null value
    pub min: Option<f64>,

    /// Largest non-null value
    pub max: Option<f64>,

    /// Number of non-null values
    pub count: usize,

    /// Distinct devices that reported in the hour
    pub device_count: usize,
}

impl BucketStats {
    /// Computes the statistics of `metric` in `bucket`.
    #[must_use]
    pub fn of(bucket: &Bucket<'_>, metric: Metric) -> Self {
        Self {
            mean: fold::<Avg>(bucket.values(metric)),
            min: fold::<Min>(bucket.values(metric)),
            max: fold::<Max>(bucket.values(metric)),
            count: bucket.values(metric).count(),
            device_count: bucket.device_count(),
        }
    }
}

/// Statistics of one metric across a whole window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowStats {
    /// Number of non-null values
    pub total_readings: usize,

    /// Mean
    pub mean: Option<f64>,

    /// Minimum
    pub min: Option<f64>,

    /// Maximum
    pub max: Option<f64>,

    /// Population standard deviation
    pub stddev: Option<f64>,

    /// 50th percentile (interpolated)
    pub median: Option<f64>,

    /// 95th percentile (interpolated)
    pub p95: Option<f64>,
}

impl WindowStats {
    /// Computes the statistics over all `values`.
    #[must_use]
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);

        Self {
            total_readings: values.len(),
            mean: fold::<Avg>(values.iter().copied()),
            min: values.first().copied(),
            max: values.last().copied(),
            stddev: population_stddev(&values),
            median: interpolate(&values, 0.5),
            p95: interpolate(&values, 0.95),
        }
    }
}

/// Statistics of the newest values of one metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatestStats {
    /// Newest value
    pub latest: f64,

    /// Mean
    pub average: f64,

    /// Minimum
    pub min: f64,

    /// Maximum
    pub max: f64,

    /// Number of values
    pub count: usize,
}

impl LatestStats {
    /// Computes the statistics over `values`, newest first.
    ///
    /// Returns `None` if there are no values.
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        Some(Self {
            latest: *values.first()?,
            average: fold::<Avg>(values.iter().copied())?,
            min: fold::<Min>(values.iter().copied())?,
            max: fold::<Max>(values.iter().copied())?,
            count: values.len(),
        })
    }
}
