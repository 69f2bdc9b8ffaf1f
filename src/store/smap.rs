use super::SeriesId;
use crate::error::StorageError;
use byteorder::{BigEndian, ReadBytesExt};
use fjall::{PartitionCreateOptions, TxKeyspace, TxPartition, WriteTransaction};

/// Maps device identifiers to the series holding their readings.
pub struct SeriesMapping {
    partition: TxPartition,
}

fn decode_series_id(mut bytes: &[u8]) -> Result<SeriesId, StorageError> {
    bytes
        .read_u64::<BigEndian>()
        .map_err(|_| StorageError::Corrupted("series id"))
}

impl SeriesMapping {
    pub fn new(keyspace: &TxKeyspace) -> crate::Result<Self> {
        use fjall::CompressionType;

        let opts = PartitionCreateOptions::default()
            .block_size(4_096)
            .max_memtable_size(4_000_000)
            .compression(CompressionType::Lz4);

        let partition = keyspace.open_partition("devices", opts)?;

        Ok(Self { partition })
    }

    pub fn insert(&self, tx: &mut WriteTransaction, device_id: &str, series_id: SeriesId) {
        tx.insert(&self.partition, device_id, series_id.to_be_bytes());
    }

    pub fn get(&self, device_id: &str) -> crate::Result<Option<SeriesId>> {
        match self.partition.get(device_id)? {
            Some(bytes) => Ok(Some(decode_series_id(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn list_all(&self) -> crate::Result<Vec<(String, SeriesId)>> {
        self.partition
            .inner()
            .iter()
            .map(|kv| -> crate::Result<_> {
                let (k, v) = kv?;
                let device_id = std::str::from_utf8(&k)
                    .map_err(|_| StorageError::Corrupted("device id"))?
                    .to_owned();
                Ok((device_id, decode_series_id(&v)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn mapping_roundtrip() -> crate::Result<()> {
        let path = tempfile::tempdir()?;
        let keyspace = fjall::Config::new(&path).open_transactional()?;
        let smap = SeriesMapping::new(&keyspace)?;

        let mut tx = keyspace.write_tx();
        smap.insert(&mut tx, "Station-01", 0);
        smap.insert(&mut tx, "Station-02", 1);
        tx.commit()?;

        assert_eq!(Some(1), smap.get("Station-02")?);
        assert_eq!(None, smap.get("Station-03")?);
        assert_eq!(
            vec![("Station-01".to_owned(), 0), ("Station-02".to_owned(), 1)],
            smap.list_all()?
        );

        Ok(())
    }
}
