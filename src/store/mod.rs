mod builder;
mod codec;
mod db;
mod memory;
mod merge;
mod smap;

pub use builder::Builder;
pub use db::Database;
pub use memory::MemoryStore;

use crate::{DeviceFilter, Metric, Reading, ReadingQuery};

pub(crate) type SeriesId = u64;

/// Source of raw readings.
///
/// Implementations translate a [`ReadingQuery`] into their own storage access.
/// Failures are reported as [`crate::Error::StorageUnavailable`] and are never retried
/// by the engine.
pub trait ReadingStore {
    /// Returns every reading from `query.since()` through `query.now`, both inclusive,
    /// that passes the device filter,
    /// with at least the requested metric columns populated.
    ///
    /// Readings may come back in any order.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the store cannot serve the request.
    fn fetch_readings(&self, query: &ReadingQuery) -> crate::Result<Vec<Reading>>;

    /// Returns up to `limit` newest readings passing the device filter, newest first,
    /// with at least `metric` populated where reported.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the store cannot serve the request.
    fn fetch_latest(
        &self,
        metric: Metric,
        device: &DeviceFilter,
        limit: usize,
    ) -> crate::Result<Vec<Reading>>;
}

impl<S: ReadingStore + ?Sized> ReadingStore for &S {
    fn fetch_readings(&self, query: &ReadingQuery) -> crate::Result<Vec<Reading>> {
        (**self).fetch_readings(query)
    }

    fn fetch_latest(
        &self,
        metric: Metric,
        device: &DeviceFilter,
        limit: usize,
    ) -> crate::Result<Vec<Reading>> {
        (**self).fetch_latest(metric, device, limit)
    }
}

impl<S: ReadingStore + ?Sized> ReadingStore for std::sync::Arc<S> {
    fn fetch_readings(&self, query: &ReadingQuery) -> crate::Result<Vec<Reading>> {
        (**self).fetch_readings(query)
    }

    fn fetch_latest(
        &self,
        metric: Metric,
        device: &DeviceFilter,
        limit: usize,
    ) -> crate::Result<Vec<Reading>> {
        (**self).fetch_latest(metric, device, limit)
    }
}
