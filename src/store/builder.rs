use crate::Database;
use fjall::{BlockCache, TxKeyspace};
use std::{path::Path, sync::Arc};

/// Builder for [`Database`].
pub struct Builder {
    cache_size_mib: u64,
    hyper_mode: bool,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            cache_size_mib: 64,
            hyper_mode: false,
        }
    }

    /// Sets the block cache size in MiB.
    ///
    /// Default = 64 MiB
    #[must_use]
    pub fn cache_size_mib(mut self, mib: u64) -> Self {
        self.cache_size_mib = mib;
        self
    }

    /// If `true`, writes become faster by skipping the `write()` syscall to OS buffers.
    ///
    /// Readings are then only durable after [`Database::persist`].
    #[must_use]
    pub fn hyper_mode(mut self, enabled: bool) -> Self {
        self.hyper_mode = enabled;
        self
    }

    /// Opens or recovers a reading store.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if an I/O error occurred.
    pub fn open<P: AsRef<Path>>(self, path: P) -> crate::Result<Database> {
        log::debug!(
            "opening reading store at {:?} (cache={} MiB, hyper_mode={})",
            path.as_ref(),
            self.cache_size_mib,
            self.hyper_mode,
        );

        let keyspace = fjall::Config::new(path)
            .block_cache(Arc::new(BlockCache::with_capacity_bytes(
                self.cache_size_mib * 1_024 * 1_024,
            )))
            .manual_journal_persist(self.hyper_mode)
            .open_transactional()?;

        Database::from_keyspace(keyspace)
    }

    /// Opens a reading store inside an existing `fjall` keyspace.
    ///
    /// Uses the `devices` partition and one `s#<id>` partition per device.
    /// Cache and persistence settings of the keyspace are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if an I/O error occurred.
    pub fn open_in_keyspace(self, keyspace: TxKeyspace) -> crate::Result<Database> {
        Database::from_keyspace(keyspace)
    }
}
