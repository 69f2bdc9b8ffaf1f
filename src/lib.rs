//! Hourly aggregation and correlation of air-quality sensor readings.
//!
//! Raw readings (PM2.5, PM10, temperature, humidity) are fetched from a [`ReadingStore`],
//! grouped into UTC hour buckets and reduced to descriptive statistics
//! (mean, min, max, count, population stddev, interpolated median and p95)
//! or to a Pearson correlation between two metrics.
//!
//! Readings can be kept in memory ([`MemoryStore`]) or persisted in an embedded
//! LSM-tree store built on <https://github.com/fjall-rs/fjall> ([`Database`]),
//! one partition per device, range-scanned by timestamp.
//!
//! Requests are validated before the store is touched, and every window is
//! computed against an explicit reference instant, so results are deterministic.
//!
//! ```
//! # let path = tempfile::tempdir()?;
//! use airsense::{Database, Engine, Metric, Reading};
//!
//! let db = Database::builder().cache_size_mib(16).open(&path)?;
//!
//! for (ts, pm25) in [
//!     ("2024-01-01T10:15:00Z", 40.0),
//!     ("2024-01-01T10:45:00Z", 50.0),
//!     ("2024-01-01T11:05:00Z", 20.0),
//! ] {
//!     db.write(&Reading::new("Station-01", ts.parse().unwrap()).with(Metric::Pm25, pm25))?;
//! }
//!
//! let engine = Engine::new(db);
//!
//! let response = engine
//!     .aggregate("pm25")
//!     .period("24h")
//!     .at("2024-01-01T12:00:00Z".parse().unwrap())
//!     .run()?;
//!
//! assert_eq!(2, response.buckets.len());
//! assert_eq!(Some(45.0), response.buckets[0].mean);
//! assert_eq!(2, response.buckets[0].count);
//! assert_eq!(Some(20.0), response.buckets[1].mean);
//!
//! # Ok::<(), airsense::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod agg;
mod bucket;
mod correlate;
mod device;

/// Request builders of the [`Engine`].
pub mod engine;

mod error;

pub mod format;

mod metric;
mod query;
mod reading;

/// Reading stores.
pub mod store;

mod time;
mod window;

type HashSet<T> = std::collections::HashSet<T, rustc_hash::FxBuildHasher>;

pub use agg::{
    fold, percentile_cont, population_stddev, Aggregation, Avg, BucketStats, LatestStats, Max,
    Min, WindowStats,
};
pub use bucket::{bucketize, Bucket};
pub use correlate::{pearson, Correlation, PairedBucket, Strength};
pub use device::{DeviceFilter, DeviceId};
pub use engine::Engine;
pub use error::{Error, InvalidArgument, Result, StorageError};
pub use metric::Metric;
pub use query::ReadingQuery;
pub use reading::Reading;
pub use store::{Database, MemoryStore, ReadingStore};
pub use time::{now, truncate_to_hour};
pub use window::{Window, MAX_WINDOW_HOURS};
