use super::{fold, Avg};

/// Population standard deviation of `values`.
///
/// Returns `None` for an empty input.
#[must_use]
pub fn population_stddev(values: &[f64]) -> Option<f64> {
    let mean = fold::<Avg>(values.iter().copied())?;
    let variance = fold::<Avg>(values.iter().map(|x| (x - mean).powi(2)))?;
    Some(variance.sqrt())
}
