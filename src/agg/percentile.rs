/// Continuous percentile of `values` (`PERCENTILE_CONT` semantics).
///
/// Interpolates linearly between the two closest order statistics.
/// `p` is a fraction in `0.0..=1.0` and is clamped into that range.
/// Returns `None` for an empty input.
///
/// ```
/// use airsense::percentile_cont;
///
/// assert_eq!(Some(2.5), percentile_cont(vec![4.0, 1.0, 3.0, 2.0], 0.5));
/// assert_eq!(None, percentile_cont(vec![], 0.95));
/// ```
#[must_use]
pub fn percentile_cont(mut values: Vec<f64>, p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(f64::total_cmp);
    interpolate(&values, p)
}

/// Same as [`percentile_cont`], for values that are already sorted ascending.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(crate) fn interpolate(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;

    let rank = p.clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    let lo = *sorted.get(lower)?;
    let hi = *sorted.get(upper)?;

    Some((hi - lo).mul_add(rank - lower as f64, lo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(Some(3.0), percentile_cont(vec![5.0, 1.0, 3.0], 0.5));
        assert_eq!(Some(2.5), percentile_cont(vec![1.0, 2.0, 3.0, 4.0], 0.5));
    }

    #[test]
    fn p95_interpolates() {
        // rank = 0.95 * 9 = 8.55, between 9.0 and 10.0
        let values = (1..=10).map(f64::from).collect::<Vec<_>>();
        let p95 = percentile_cont(values, 0.95).unwrap_or_default();
        assert!((p95 - 9.55).abs() < 1e-9);
    }

    #[test]
    fn single_value() {
        assert_eq!(Some(42.0), percentile_cont(vec![42.0], 0.95));
    }

    #[test]
    fn extremes() {
        let values = vec![3.0, 1.0, 2.0];
        assert_eq!(Some(1.0), percentile_cont(values.clone(), 0.0));
        assert_eq!(Some(3.0), percentile_cont(values, 1.0));
    }
}
