use super::Engine;
use crate::{
    agg::{fold, Avg, BucketStats, LatestStats, WindowStats},
    bucket::bucketize,
    correlate::Correlation,
    format::{
        AggregateResponse, BucketRow, CorrelationResponse, Echo, HistoricalResponse,
        LatestResponse, LatestStatistics, RangeRow, ReadingRow, SeriesRow, StatisticsRow,
        SummaryResponse, TrendRow, WindowResponse,
    },
    time, DeviceFilter, Error, Metric, ReadingQuery, ReadingStore, Window,
};
use chrono::{DateTime, Utc};

/// Most recent hours listed in a window trend
const TREND_HOURS: usize = 24;

/// Readings returned by a latest-values request
const LATEST_LIMIT: usize = 10;

/// `aggregate` request
pub struct Aggregate<'a> {
    metric: &'a str,
}

/// `aggregate_window` request
pub struct AggregateWindow<'a> {
    metric: &'a str,
}

/// `correlate` request
pub struct Correlate<'a> {
    metric_a: &'a str,
    metric_b: &'a str,
}

/// `historical` request
pub struct Historical;

/// `summary` request
pub struct Summary;

/// `latest` request
pub struct Latest<'a> {
    metric: &'a str,
}

enum WindowArg<'a> {
    Default,
    Hours(u32),
    Period(&'a str),
}

/// Validated arguments shared by every request
struct Prepared {
    device: DeviceFilter,
    window: Window,

    /// Window as echoed back, the caller's label if one was given
    period: String,

    now: DateTime<Utc>,
}

impl Prepared {
    fn query(&self, metrics: Vec<Metric>) -> ReadingQuery {
        ReadingQuery {
            metrics,
            device: self.device.clone(),
            window: self.window,
            now: self.now,
        }
    }

    fn echo(&self) -> Echo {
        Echo::new(Some(&self.period), &self.device, self.now)
    }
}

/// Configures one engine request.
///
/// Arguments are validated in [`Builder::run`], before the store is touched.
pub struct Builder<'a, S, Op> {
    engine: &'a Engine<S>,
    op: Op,

    /// Raw device identifier, `None` for all devices
    device: Option<&'a str>,

    /// Lookback
    window: WindowArg<'a>,

    /// Reference instant, wall clock if unset
    now: Option<DateTime<Utc>>,
}

impl<'a, S: ReadingStore, Op> Builder<'a, S, Op> {
    pub(crate) fn new(engine: &'a Engine<S>, op: Op) -> Self {
        Self {
            engine,
            op,
            device: None,
            window: WindowArg::Default,
            now: None,
        }
    }

    /// Restricts the request to one device.
    #[must_use]
    pub fn device(mut self, device_id: &'a str) -> Self {
        self.device = Some(device_id);
        self
    }

    /// Sets the lookback in hours (1..=168, default 24).
    #[must_use]
    pub fn hours(mut self, hours: u32) -> Self {
        self.window = WindowArg::Hours(hours);
        self
    }

    /// Sets the lookback from a period label, e.g. `24h` or `7d`.
    #[must_use]
    pub fn period(mut self, label: &'a str) -> Self {
        self.window = WindowArg::Period(label);
        self
    }

    /// Sets the instant the window ends at.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn prepare(&self) -> crate::Result<Prepared> {
        let device = DeviceFilter::parse(self.device)?;

        let (window, label) = match self.window {
            WindowArg::Default => (Window::default(), None),
            WindowArg::Hours(hours) => (Window::hours(hours)?, None),
            WindowArg::Period(label) => (Window::parse(label)?, Some(label)),
        };

        Ok(Prepared {
            device,
            window,
            period: label.map_or_else(|| window.to_string(), str::to_owned),
            now: self.now.unwrap_or_else(time::now),
        })
    }
}

impl<'a, S: ReadingStore> Builder<'a, S, Aggregate<'a>> {
    /// Runs the request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a bad argument,
    /// `StorageUnavailable` if the store failed.
    pub fn run(self) -> crate::Result<AggregateResponse> {
        let metric = Metric::try_from(self.op.metric)?;
        let prepared = self.prepare()?;

        let readings = self.engine.store.fetch_readings(&prepared.query(vec![metric]))?;

        let buckets = bucketize(&readings)
            .iter()
            .map(|bucket| BucketRow::new(bucket.start(), &BucketStats::of(bucket, metric)))
            .collect::<Vec<_>>();

        log::debug!(
            "aggregated {} readings of {metric} into {} hours",
            readings.len(),
            buckets.len(),
        );

        Ok(AggregateResponse {
            data_type: metric,
            buckets,
            echo: prepared.echo(),
        })
    }
}

impl<'a, S: ReadingStore> Builder<'a, S, AggregateWindow<'a>> {
    /// Runs the request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a bad argument,
    /// `StorageUnavailable` if the store failed.
    pub fn run(self) -> crate::Result<WindowResponse> {
        let metric = Metric::try_from(self.op.metric)?;
        let prepared = self.prepare()?;

        let readings = self.engine.store.fetch_readings(&prepared.query(vec![metric]))?;

        let statistics = WindowStats::of(readings.iter().filter_map(|r| r.value(metric)));

        let mut trends = bucketize(&readings)
            .iter()
            .filter_map(|bucket| TrendRow::new(bucket.start(), &BucketStats::of(bucket, metric)))
            .collect::<Vec<_>>();

        let trends = trends.split_off(trends.len().saturating_sub(TREND_HOURS));

        log::debug!(
            "summarized {} values of {metric}, {} trend hours",
            statistics.total_readings,
            trends.len(),
        );

        Ok(WindowResponse {
            data_type: metric,
            statistics: StatisticsRow::from(&statistics),
            trends,
            echo: prepared.echo(),
        })
    }
}

impl<'a, S: ReadingStore> Builder<'a, S, Correlate<'a>> {
    /// Runs the request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a bad argument or two identical metrics,
    /// `StorageUnavailable` if the store failed.
    pub fn run(self) -> crate::Result<CorrelationResponse> {
        let a = Metric::try_from(self.op.metric_a)?;
        let b = Metric::try_from(self.op.metric_b)?;

        if a == b {
            return Err(Error::invalid("metric_b", b, "must differ from metric_a"));
        }

        let prepared = self.prepare()?;

        let readings = self.engine.store.fetch_readings(&prepared.query(vec![a, b]))?;
        let correlation = Correlation::compute(&bucketize(&readings), a, b);

        Ok(CorrelationResponse::new(&correlation, prepared.echo()))
    }
}

impl<'a, S: ReadingStore> Builder<'a, S, Historical> {
    /// Runs the request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a bad argument,
    /// `StorageUnavailable` if the store failed.
    pub fn run(self) -> crate::Result<HistoricalResponse> {
        let prepared = self.prepare()?;

        let readings = self
            .engine
            .store
            .fetch_readings(&prepared.query(Metric::ALL.to_vec()))?;

        let buckets = bucketize(&readings)
            .iter()
            .map(|bucket| {
                SeriesRow::new(
                    bucket.start(),
                    Metric::ALL.map(|metric| (metric, fold::<Avg>(bucket.values(metric)))),
                    bucket.device_count(),
                )
            })
            .collect::<Vec<_>>();

        log::debug!("historical series over {} hours", buckets.len());

        Ok(HistoricalResponse {
            buckets,
            echo: prepared.echo(),
        })
    }
}

impl<'a, S: ReadingStore> Builder<'a, S, Summary> {
    /// Runs the request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a bad argument,
    /// `StorageUnavailable` if the store failed.
    pub fn run(self) -> crate::Result<SummaryResponse> {
        let prepared = self.prepare()?;

        let readings = self
            .engine
            .store
            .fetch_readings(&prepared.query(Metric::ALL.to_vec()))?;

        let metrics = Metric::ALL
            .into_iter()
            .map(|metric| {
                let stats = WindowStats::of(readings.iter().filter_map(|r| r.value(metric)));
                (metric.as_str(), RangeRow::from(&stats))
            })
            .collect();

        Ok(SummaryResponse {
            total_readings: readings.len(),
            metrics,
            echo: prepared.echo(),
        })
    }
}

impl<'a, S: ReadingStore> Builder<'a, S, Latest<'a>> {
    /// Runs the request.
    ///
    /// The window is ignored; the newest readings are returned whatever their age.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a bad argument,
    /// `StorageUnavailable` if the store failed.
    pub fn run(self) -> crate::Result<LatestResponse> {
        let metric = Metric::try_from(self.op.metric)?;
        let prepared = self.prepare()?;

        let readings = self
            .engine
            .store
            .fetch_latest(metric, &prepared.device, LATEST_LIMIT)?;

        let values = readings
            .iter()
            .filter_map(|r| r.value(metric))
            .collect::<Vec<_>>();

        Ok(LatestResponse {
            data_type: metric,
            readings: readings.iter().map(|r| ReadingRow::new(r, metric)).collect(),
            statistics: LatestStats::of(&values).as_ref().map(LatestStatistics::from),
            echo: Echo::new(None, &prepared.device, prepared.now),
        })
    }
}

impl<'a> Aggregate<'a> {
    pub(crate) const fn new(metric: &'a str) -> Self {
        Self { metric }
    }
}

impl<'a> AggregateWindow<'a> {
    pub(crate) const fn new(metric: &'a str) -> Self {
        Self { metric }
    }
}

impl<'a> Correlate<'a> {
    pub(crate) const fn new(metric_a: &'a str, metric_b: &'a str) -> Self {
        Self { metric_a, metric_b }
    }
}

impl<'a> Latest<'a> {
    pub(crate) const fn new(metric: &'a str) -> Self {
        Self { metric }
    }
}
