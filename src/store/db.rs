use super::{
    codec::{decode_key, decode_values, encode_key, encode_ts, encode_values},
    merge::Merger,
    smap::SeriesMapping,
    Builder, ReadingStore, SeriesId,
};
use crate::{DeviceFilter, Metric, Reading, ReadingQuery};
use fjall::{CompressionType, Partition, PartitionCreateOptions, PersistMode, TxKeyspace};
use std::{collections::BTreeMap, sync::RwLock};

/// Readings of one device
#[derive(Clone)]
struct Series {
    device_id: String,
    partition: Partition,
}

/// Reading store backed by a fjall keyspace.
///
/// Every device gets its own partition, keyed by reading timestamp,
/// so window queries are range scans merged across devices.
///
/// ```
/// # let path = tempfile::tempdir()?;
/// use airsense::{Database, Metric, Reading};
///
/// let db = Database::builder().open(&path)?;
///
/// db.write(
///     &Reading::new("Station-01", "2024-01-01T10:15:00Z".parse().unwrap())
///         .with(Metric::Pm25, 40.0)
///         .with(Metric::Temperature, 27.5),
/// )?;
///
/// assert_eq!(vec!["Station-01".to_owned()], db.devices());
/// # Ok::<(), airsense::Error>(())
/// ```
pub struct Database {
    keyspace: TxKeyspace,
    series: RwLock<BTreeMap<SeriesId, Series>>,
    smap: SeriesMapping,
}

impl Database {
    /// Creates a builder to configure and open a database.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn from_keyspace(keyspace: TxKeyspace) -> crate::Result<Self> {
        let smap = SeriesMapping::new(&keyspace)?;

        let mut series = BTreeMap::new();

        for (device_id, series_id) in smap.list_all()? {
            let partition = keyspace.open_partition(&Self::series_name(series_id), Self::series_options())?;

            log::trace!("recovered series {series_id} for device {device_id:?}");

            series.insert(
                series_id,
                Series {
                    device_id,
                    partition: partition.inner().clone(),
                },
            );
        }

        log::debug!("opened reading store with {} devices", series.len());

        Ok(Self {
            keyspace,
            series: RwLock::new(series),
            smap,
        })
    }

    fn series_name(series_id: SeriesId) -> String {
        format!("s#{series_id}")
    }

    fn series_options() -> PartitionCreateOptions {
        PartitionCreateOptions::default()
            .block_size(64_000)
            .compression(CompressionType::Lz4)
    }

    /// Identifiers of every device that ever reported, in registration order.
    #[must_use]
    pub fn devices(&self) -> Vec<String> {
        self.series
            .read()
            .expect("lock is poisoned")
            .values()
            .map(|series| series.device_id.clone())
            .collect()
    }

    /// Stores a reading, registering its device on first sight.
    ///
    /// Readings of one device at the same instant are all kept.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the reading fails validation,
    /// `StorageUnavailable` if an I/O error occurred.
    pub fn write(&self, reading: &Reading) -> crate::Result<()> {
        reading.validate()?;

        let series = self.series_for(&reading.device_id)?;

        let seq = match series.prefix(encode_ts(reading.timestamp)).next_back() {
            Some(kv) => decode_key(&kv?.0)?.1 + 1,
            None => 0,
        };

        series.insert(encode_key(reading.timestamp, seq), encode_values(reading))?;

        Ok(())
    }

    /// Flushes and syncs all written readings to disk.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if an I/O error occurred.
    pub fn persist(&self) -> crate::Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn series_for(&self, device_id: &str) -> crate::Result<Partition> {
        if let Some(series_id) = self.smap.get(device_id)? {
            if let Some(series) = self.series.read().expect("lock is poisoned").get(&series_id) {
                return Ok(series.partition.clone());
            }
        }

        let mut series_lock = self.series.write().expect("lock is poisoned");

        // NOTE: Another writer may have registered the device while we waited for the lock
        if let Some(series_id) = self.smap.get(device_id)? {
            if let Some(series) = series_lock.get(&series_id) {
                return Ok(series.partition.clone());
            }
        }

        let next_series_id = series_lock.keys().max().map(|x| x + 1).unwrap_or_default();

        log::trace!("creating series {next_series_id} for device {device_id:?}");

        let partition = self
            .keyspace
            .open_partition(&Self::series_name(next_series_id), Self::series_options())?;

        let mut tx = self.keyspace.write_tx();
        self.smap.insert(&mut tx, device_id, next_series_id);
        tx.commit()?;

        // NOTE: Get inner because we don't want to insert and read series data in a transactional context
        let partition = partition.inner().clone();

        series_lock.insert(
            next_series_id,
            Series {
                device_id: device_id.to_owned(),
                partition: partition.clone(),
            },
        );

        Ok(partition)
    }

    fn select(&self, device: &DeviceFilter) -> crate::Result<Vec<Series>> {
        let series_id = match device {
            DeviceFilter::All => None,
            DeviceFilter::Device(id) => match self.smap.get(id)? {
                Some(series_id) => Some(series_id),
                None => return Ok(vec![]),
            },
        };

        let lock = self.series.read().expect("lock is poisoned");

        Ok(match series_id {
            Some(series_id) => lock.get(&series_id).cloned().into_iter().collect(),
            None => lock.values().cloned().collect(),
        })
    }
}

impl ReadingStore for Database {
    fn fetch_readings(&self, query: &ReadingQuery) -> crate::Result<Vec<Reading>> {
        let selected = self.select(&query.device)?;

        if selected.is_empty() {
            log::debug!("Query {query} did not match any device");
            return Ok(vec![]);
        }

        log::debug!("Querying {query} in {} series", selected.len());

        let lower = encode_key(query.since(), 0);
        let upper = encode_key(query.now, u64::MAX);
        let metrics = &query.metrics;

        let readers = selected
            .into_iter()
            .map(|Series { device_id, partition }| {
                partition
                    .range(lower..=upper)
                    .map(move |kv| -> crate::Result<Reading> {
                        let (k, v) = kv?;
                        let (ts, _) = decode_key(&k)?;
                        Ok(decode_values(&device_id, ts, &v)?.project(metrics))
                    })
            })
            .collect::<Vec<_>>();

        let readings = Merger::new(readers).collect::<crate::Result<Vec<_>>>()?;

        log::trace!("query {query} scanned {} readings", readings.len());

        Ok(readings)
    }

    fn fetch_latest(
        &self,
        metric: Metric,
        device: &DeviceFilter,
        limit: usize,
    ) -> crate::Result<Vec<Reading>> {
        let mut latest = vec![];

        for Series {
            device_id,
            partition,
        } in self.select(device)?
        {
            for kv in partition.iter().rev().take(limit) {
                let (k, v) = kv?;
                let (ts, _) = decode_key(&k)?;
                latest.push(decode_values(&device_id, ts, &v)?.project(&[metric]));
            }
        }

        latest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        latest.truncate(limit);

        Ok(latest)
    }
}
