use crate::agg::{fold, Avg};
use crate::{bucket::Bucket, Metric};
use chrono::{DateTime, Utc};

/// Qualitative strength of a correlation coefficient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// `|r| <= 0.3`
    Weak,

    /// `0.3 < |r| <= 0.7`
    Moderate,

    /// `|r| > 0.7`
    Strong,
}

impl Strength {
    /// Labels a coefficient by its magnitude.
    #[must_use]
    pub fn of(r: f64) -> Self {
        let r = r.abs();

        if r > 0.7 {
            Self::Strong
        } else if r > 0.3 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    /// The label's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pearson correlation coefficient of two equally long series.
///
/// Uses the mean-centred form of
/// `r = (nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))`.
/// Fewer than 2 pairs, or a constant series on either side, yields `0`.
/// Extra elements of the longer series are ignored.
///
/// ```
/// use airsense::pearson;
///
/// assert_eq!(-1.0, pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]));
/// assert_eq!(0.0, pearson(&[1.0], &[1.0]));
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }

    let (xs, ys) = (xs.iter().take(n), ys.iter().take(n));

    if is_constant(xs.clone()) || is_constant(ys.clone()) {
        return 0.0;
    }

    let mean_x = xs.clone().sum::<f64>() / n as f64;
    let mean_y = ys.clone().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (x, y) in xs.zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());

    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[allow(clippy::float_cmp)]
fn is_constant<'a>(mut values: impl Iterator<Item = &'a f64>) -> bool {
    let Some(first) = values.next() else {
        return true;
    };
    values.all(|x| x == first)
}

/// One hour of a two-metric comparison.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairedBucket {
    /// Start of the hour
    pub start: DateTime<Utc>,

    /// Mean of the first metric, if it was reported
    pub a: Option<f64>,

    /// Mean of the second metric, if it was reported
    pub b: Option<f64>,

    /// Distinct devices that reported in the hour
    pub device_count: usize,
}

impl PairedBucket {
    fn pair(&self) -> Option<(f64, f64)> {
        Some((self.a?, self.b?))
    }
}

/// Relationship between two metrics over a shared bucket sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Correlation {
    /// First metric
    pub a: Metric,

    /// Second metric
    pub b: Metric,

    /// Every hour where at least one of the metrics was reported, ascending
    pub buckets: Vec<PairedBucket>,

    /// Pearson coefficient over hours where both metrics were reported (unrounded)
    pub coefficient: f64,

    /// Label of the coefficient
    pub strength: Strength,
}

impl Correlation {
    /// Correlates the per-hour means of `a` and `b`.
    ///
    /// Hours carrying only one of the metrics stay in the series,
    /// but do not enter the coefficient.
    #[must_use]
    pub fn compute(buckets: &[Bucket<'_>], a: Metric, b: Metric) -> Self {
        let buckets = buckets
            .iter()
            .map(|bucket| PairedBucket {
                start: bucket.start(),
                a: fold::<Avg>(bucket.values(a)),
                b: fold::<Avg>(bucket.values(b)),
                device_count: bucket.device_count(),
            })
            .filter(|paired| paired.a.is_some() || paired.b.is_some())
            .collect::<Vec<_>>();

        let (xs, ys): (Vec<f64>, Vec<f64>) = buckets.iter().filter_map(PairedBucket::pair).unzip();

        let coefficient = pearson(&xs, &ys);

        log::debug!(
            "correlated {a} and {b} over {} of {} hours: r={coefficient}",
            xs.len(),
            buckets.len(),
        );

        Self {
            a,
            b,
            buckets,
            coefficient,
            strength: Strength::of(coefficient),
        }
    }
}
