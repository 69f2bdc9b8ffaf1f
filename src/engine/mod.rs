mod builder;

pub use builder::{Aggregate, AggregateWindow, Builder, Correlate, Historical, Latest, Summary};

/// Query engine over a reading store.
///
/// Every request is a single round trip to the store followed by in-memory
/// bucketing and reduction; the engine holds no state between requests.
///
/// ```
/// use airsense::{Engine, MemoryStore, Metric, Reading};
///
/// let store = MemoryStore::default();
/// store.insert(
///     Reading::new("Station-01", "2024-01-01T10:15:00Z".parse().unwrap())
///         .with(Metric::Pm25, 40.0),
/// );
///
/// let engine = Engine::new(store);
///
/// let response = engine
///     .aggregate("pm25")
///     .device("Station-01")
///     .hours(6)
///     .at("2024-01-01T12:00:00Z".parse().unwrap())
///     .run()?;
///
/// assert_eq!(1, response.buckets.len());
/// assert_eq!("2024-01-01T10:00:00Z", response.buckets[0].timestamp);
/// # Ok::<(), airsense::Error>(())
/// ```
pub struct Engine<S> {
    store: S,
}

impl<S: crate::ReadingStore> Engine<S> {
    /// Creates an engine reading from `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying reading store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hourly mean/min/max/count of one metric.
    pub fn aggregate<'a>(&'a self, metric: &'a str) -> Builder<'a, S, Aggregate<'a>> {
        Builder::new(self, Aggregate::new(metric))
    }

    /// Whole-window statistics of one metric, plus its recent hourly trend.
    pub fn aggregate_window<'a>(&'a self, metric: &'a str) -> Builder<'a, S, AggregateWindow<'a>> {
        Builder::new(self, AggregateWindow::new(metric))
    }

    /// Hour-by-hour comparison of two distinct metrics with their Pearson coefficient.
    pub fn correlate<'a>(
        &'a self,
        metric_a: &'a str,
        metric_b: &'a str,
    ) -> Builder<'a, S, Correlate<'a>> {
        Builder::new(self, Correlate::new(metric_a, metric_b))
    }

    /// Hourly means of every metric.
    pub fn historical(&self) -> Builder<'_, S, Historical> {
        Builder::new(self, Historical)
    }

    /// Mean/min/max of every metric over the whole window.
    pub fn summary(&self) -> Builder<'_, S, Summary> {
        Builder::new(self, Summary)
    }

    /// The 10 newest readings of one metric.
    pub fn latest<'a>(&'a self, metric: &'a str) -> Builder<'a, S, Latest<'a>> {
        Builder::new(self, Latest::new(metric))
    }
}
