/// Arithmetic mean
#[derive(Clone)]
pub struct Avg;

impl super::Aggregation for Avg {
    #[allow(clippy::cast_precision_loss)]
    fn finish(accu: f64, len: usize) -> f64 {
        accu / len as f64
    }
}
