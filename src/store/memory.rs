use super::ReadingStore;
use crate::{DeviceFilter, Metric, Reading, ReadingQuery};
use std::sync::RwLock;

/// Readings held in memory, in insertion order.
///
/// ```
/// use airsense::{Metric, MemoryStore, Reading};
///
/// let store = MemoryStore::default();
/// store.insert(
///     Reading::new("Station-01", "2024-01-01T10:15:00Z".parse().unwrap())
///         .with(Metric::Pm25, 40.0),
/// );
/// assert_eq!(1, store.len());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: RwLock<Vec<Reading>>,
}

impl MemoryStore {
    /// Creates a store holding `readings`.
    #[must_use]
    pub fn new(readings: Vec<Reading>) -> Self {
        Self {
            readings: RwLock::new(readings),
        }
    }

    /// Appends a reading.
    pub fn insert(&self, reading: Reading) {
        self.readings
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(reading);
    }

    /// Number of stored readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readings
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no readings are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<Reading> for MemoryStore {
    fn extend<T: IntoIterator<Item = Reading>>(&mut self, iter: T) {
        self.readings
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend(iter);
    }
}

impl ReadingStore for MemoryStore {
    fn fetch_readings(&self, query: &ReadingQuery) -> crate::Result<Vec<Reading>> {
        let readings = self
            .readings
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        Ok(readings
            .iter()
            .filter(|r| query.matches(r))
            .map(|r| r.project(&query.metrics))
            .collect())
    }

    fn fetch_latest(
        &self,
        metric: Metric,
        device: &DeviceFilter,
        limit: usize,
    ) -> crate::Result<Vec<Reading>> {
        let readings = self
            .readings
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut latest = readings
            .iter()
            .filter(|r| device.matches(&r.device_id))
            .collect::<Vec<_>>();

        latest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        latest.truncate(limit);

        Ok(latest.into_iter().map(|r| r.project(&[metric])).collect())
    }
}
