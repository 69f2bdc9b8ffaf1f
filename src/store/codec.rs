use crate::{error::StorageError, Metric, Reading};
use byteorder::{BigEndian, ReadBytesExt};
use chrono::{DateTime, Utc};

const SIGN_BIT: u64 = 1 << 63;

/// Presence mask + one f64 per metric
const VALUE_LEN: usize = 1 + 8 * Metric::ALL.len();

/// Encodes a timestamp as a big-endian key that sorts chronologically.
///
/// Microsecond precision; the sign bit is flipped so instants before the epoch sort first.
#[allow(clippy::cast_sign_loss)]
pub fn encode_ts(ts: DateTime<Utc>) -> [u8; 8] {
    ((ts.timestamp_micros() as u64) ^ SIGN_BIT).to_be_bytes()
}

#[allow(clippy::cast_possible_wrap)]
pub fn decode_ts(mut bytes: &[u8]) -> Result<DateTime<Utc>, StorageError> {
    let raw = bytes
        .read_u64::<BigEndian>()
        .map_err(|_| StorageError::Corrupted("reading key"))?;

    let micros = (raw ^ SIGN_BIT) as i64;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;

    DateTime::from_timestamp(micros.div_euclid(1_000_000), nanos)
        .ok_or(StorageError::Corrupted("reading key"))
}

/// Key of a stored reading: its timestamp, then a sequence number
/// telling apart readings of one device at the same instant.
pub fn encode_key(ts: DateTime<Utc>, seq: u64) -> [u8; 16] {
    let mut key = [0; 16];
    let (head, tail) = key.split_at_mut(8);
    head.copy_from_slice(&encode_ts(ts));
    tail.copy_from_slice(&seq.to_be_bytes());
    key
}

pub fn decode_key(bytes: &[u8]) -> Result<(DateTime<Utc>, u64), StorageError> {
    let ts = decode_ts(bytes)?;

    let mut tail = bytes.get(8..).unwrap_or_default();
    let seq = tail
        .read_u64::<BigEndian>()
        .map_err(|_| StorageError::Corrupted("reading key"))?;

    Ok((ts, seq))
}

pub fn encode_values(reading: &Reading) -> Vec<u8> {
    let mut mask = 0u8;
    let mut buf = Vec::with_capacity(VALUE_LEN);
    buf.push(0);

    for metric in Metric::ALL {
        let value = reading.slot(metric);
        if value.is_some() {
            mask |= 1 << metric.index();
        }

        buf.extend_from_slice(&value.unwrap_or_default().to_be_bytes());
    }

    if let Some(first) = buf.first_mut() {
        *first = mask;
    }

    buf
}

pub fn decode_values(
    device_id: &str,
    ts: DateTime<Utc>,
    mut bytes: &[u8],
) -> Result<Reading, StorageError> {
    if bytes.len() != VALUE_LEN {
        return Err(StorageError::Corrupted("reading value"));
    }

    let mask = bytes
        .read_u8()
        .map_err(|_| StorageError::Corrupted("reading value"))?;

    let mut reading = Reading::new(device_id, ts);

    for metric in Metric::ALL {
        let value = bytes
            .read_f64::<BigEndian>()
            .map_err(|_| StorageError::Corrupted("reading value"))?;

        if mask & (1 << metric.index()) != 0 {
            *reading.slot_mut(metric) = Some(value);
        }
    }

    Ok(reading)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_log::test;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn keys_sort_chronologically() {
        let instants = [
            ts("1969-12-31T23:59:59Z"),
            ts("1970-01-01T00:00:00Z"),
            ts("2024-01-01T10:15:00.000001Z"),
            ts("2024-01-01T10:15:00.000002Z"),
        ];

        let keys = instants.map(encode_ts);
        let mut sorted = keys;
        sorted.sort_unstable();
        assert_eq!(keys, sorted);

        for (instant, key) in instants.iter().zip(keys) {
            assert_eq!(*instant, decode_ts(&key).unwrap());
        }
    }

    #[test]
    fn keys_of_one_instant_sort_by_sequence() {
        let instant = ts("2024-01-01T10:15:00Z");
        let keys = [
            encode_key(instant - chrono::TimeDelta::microseconds(1), u64::MAX),
            encode_key(instant, 0),
            encode_key(instant, 1),
            encode_key(instant, 256),
            encode_key(instant + chrono::TimeDelta::microseconds(1), 0),
        ];

        let mut sorted = keys;
        sorted.sort_unstable();
        assert_eq!(keys, sorted);

        assert!(encode_key(instant, 7).starts_with(&encode_ts(instant)));
        assert_eq!((instant, 256), decode_key(&encode_key(instant, 256)).unwrap());
        assert!(decode_key(&encode_ts(instant)).is_err());
    }

    #[test]
    fn values_keep_nulls() {
        let reading = Reading::new("a", ts("2024-01-01T10:15:00Z"))
            .with(Metric::Pm10, 0.0)
            .with(Metric::Humidity, 65.5);

        let bytes = encode_values(&reading);
        assert_eq!(VALUE_LEN, bytes.len());

        let decoded = decode_values("a", reading.timestamp, &bytes).unwrap();
        assert_eq!(reading, decoded);
    }

    #[test]
    fn truncated_value_is_corrupted() {
        assert!(matches!(
            decode_values("a", ts("2024-01-01T10:15:00Z"), &[0, 1, 2]),
            Err(StorageError::Corrupted(_))
        ));
        assert!(decode_ts(&[1, 2]).is_err());
    }
}
