mod avg;
mod max;
mod min;
mod percentile;
mod stats;
mod stddev;

pub use avg::Avg;
pub use max::Max;
pub use min::Min;
pub use percentile::percentile_cont;
pub use stats::{BucketStats, LatestStats, WindowStats};
pub use stddev::population_stddev;

/// Defines a streaming aggregation over a metric's values.
///
/// - `init` turns the first value into the accumulator (default: Identity)
///
/// - `transform` folds each further value in (default: Add)
///
/// - `finish` can transform the result value (default: Identity)
pub trait Aggregation {
    /// Seeds the accumulator with the first value.
    fn init(value: f64) -> f64 {
        value
    }

    /// Folds the next value into the accumulator.
    fn transform(accu: f64, x: f64) -> f64 {
        accu + x
    }

    /// Turns the accumulator into the result, given the number of values folded.
    fn finish(accu: f64, _len: usize) -> f64 {
        accu
    }
}

/// Runs an aggregation over `values`.
///
/// Returns `None` if there are no values; an aggregate over nothing is absent, never `0`.
pub fn fold<A: Aggregation>(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut values = values.into_iter();
    let first = values.next()?;

    let (accu, len) = values.fold((A::init(first), 1), |(accu, len), x| {
        (A::transform(accu, x), len + 1)
    });

    Some(A::finish(accu, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn fold_empty_is_absent() {
        assert_eq!(None, fold::<Avg>([]));
        assert_eq!(None, fold::<Min>([]));
        assert_eq!(None, fold::<Max>([]));
    }

    #[test]
    fn fold_single_value() {
        assert_eq!(Some(7.5), fold::<Min>([7.5]));
        assert_eq!(Some(7.5), fold::<Max>([7.5]));
        assert_eq!(Some(7.5), fold::<Avg>([7.5]));
    }

    #[test]
    fn fold_many() {
        let values = [40.0, 50.0, 20.0, 10.0];
        assert_eq!(Some(10.0), fold::<Min>(values));
        assert_eq!(Some(50.0), fold::<Max>(values));
        assert_eq!(Some(30.0), fold::<Avg>(values));
    }
}
