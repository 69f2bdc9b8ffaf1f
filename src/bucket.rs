use crate::{time, HashSet, Metric, Reading};
use chrono::{DateTime, Utc};

/// Readings sharing the same UTC hour.
///
/// Borrowed from the fetched readings and dropped once the response is built.
#[derive(Clone, Debug)]
pub struct Bucket<'a> {
    start: DateTime<Utc>,
    readings: Vec<&'a Reading>,
    devices: HashSet<&'a str>,
}

impl<'a> Bucket<'a> {
    fn new(start: DateTime<Utc>, reading: &'a Reading) -> Self {
        let mut devices = HashSet::default();
        devices.insert(reading.device_id.as_str());

        Self {
            start,
            readings: vec![reading],
            devices,
        }
    }

    fn push(&mut self, reading: &'a Reading) {
        self.devices.insert(reading.device_id.as_str());
        self.readings.push(reading);
    }

    /// Start of the hour.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Canonical bucket key, e.g. `2024-01-01T10:00:00Z`.
    #[must_use]
    pub fn key(&self) -> String {
        time::format_hour(self.start)
    }

    /// Member readings, ordered by timestamp.
    #[must_use]
    pub fn readings(&self) -> &[&'a Reading] {
        &self.readings
    }

    /// Number of distinct devices that reported in this hour,
    /// whether or not they reported a given metric.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Non-null values of `metric` in this hour.
    pub fn values(&self, metric: Metric) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().filter_map(move |r| r.value(metric))
    }

    /// Returns `true` if at least one reading carries `metric`.
    #[must_use]
    pub fn has(&self, metric: Metric) -> bool {
        self.values(metric).next().is_some()
    }
}

/// Groups readings into hourly buckets, ascending by hour.
///
/// Input order does not matter. Hours without readings produce no bucket.
#[must_use]
pub fn bucketize(readings: &[Reading]) -> Vec<Bucket<'_>> {
    let mut sorted = readings.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|r| r.timestamp);

    let mut buckets: Vec<Bucket<'_>> = vec![];

    for reading in sorted {
        let start = time::truncate_to_hour(reading.timestamp);

        match buckets.last_mut() {
            // NOTE: Readings are sorted, so only the last bucket can match
            Some(last) if last.start == start => last.push(reading),
            _ => buckets.push(Bucket::new(start, reading)),
        }
    }

    log::trace!(
        "bucketized {} readings into {} hours",
        readings.len(),
        buckets.len()
    );

    buckets
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;
    use test_log::test;

    fn pm25(device: &str, ts: &str, value: f64) -> Reading {
        Reading::new(device, ts.parse().unwrap()).with(Metric::Pm25, value)
    }

    #[test]
    fn empty_input() {
        assert!(bucketize(&[]).is_empty());
    }

    #[test]
    fn groups_by_hour() {
        let readings = [
            pm25("a", "2024-01-01T10:15:00Z", 40.0),
            pm25("a", "2024-01-01T10:45:00Z", 50.0),
            pm25("a", "2024-01-01T11:05:00Z", 20.0),
        ];

        let buckets = bucketize(&readings);

        assert_eq!(2, buckets.len());
        assert_eq!("2024-01-01T10:00:00Z", buckets[0].key());
        assert_eq!(vec![40.0, 50.0], buckets[0].values(Metric::Pm25).collect::<Vec<_>>());
        assert_eq!("2024-01-01T11:00:00Z", buckets[1].key());
        assert_eq!(vec![20.0], buckets[1].values(Metric::Pm25).collect::<Vec<_>>());
    }

    #[test]
    fn unsorted_input_yields_ascending_buckets() {
        let readings = [
            pm25("a", "2024-01-01T13:00:00Z", 1.0),
            pm25("b", "2024-01-01T10:59:00Z", 2.0),
            pm25("a", "2024-01-01T10:01:00Z", 3.0),
            pm25("c", "2024-01-01T12:30:00Z", 4.0),
        ];

        let keys = bucketize(&readings)
            .iter()
            .map(Bucket::key)
            .collect::<Vec<_>>();

        assert_eq!(
            vec![
                "2024-01-01T10:00:00Z",
                "2024-01-01T12:00:00Z",
                "2024-01-01T13:00:00Z",
            ],
            keys
        );
    }

    #[test]
    fn null_readings_count_towards_devices_only() {
        let readings = [
            pm25("a", "2024-01-01T10:15:00Z", 40.0),
            Reading::new("b", "2024-01-01T10:20:00Z".parse().unwrap()),
        ];

        let buckets = bucketize(&readings);
        assert_eq!(1, buckets.len());
        assert_eq!(2, buckets[0].device_count());
        assert_eq!(1, buckets[0].values(Metric::Pm25).count());
        assert!(!buckets[0].has(Metric::Pm10));
    }

    #[test]
    fn partition_property() {
        let mut rng = rand::thread_rng();
        let base: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();

        for _ in 0..20 {
            let mut readings = (0..rng.gen_range(1..200))
                .map(|i| {
                    let offset = chrono::TimeDelta::seconds(rng.gen_range(0..7 * 86_400));
                    Reading::new(format!("d-{}", i % 5), base + offset)
                        .with(Metric::Pm25, f64::from(i))
                })
                .collect::<Vec<_>>();
            readings.shuffle(&mut rng);

            let buckets = bucketize(&readings);

            let total = buckets.iter().map(|b| b.readings().len()).sum::<usize>();
            assert_eq!(readings.len(), total);

            let mut seen = buckets
                .iter()
                .flat_map(|b| b.values(Metric::Pm25))
                .collect::<Vec<_>>();
            seen.sort_by(f64::total_cmp);
            let mut expected = readings
                .iter()
                .filter_map(|r| r.value(Metric::Pm25))
                .collect::<Vec<_>>();
            expected.sort_by(f64::total_cmp);
            assert_eq!(expected, seen);

            for pair in buckets.windows(2) {
                assert!(pair[0].start() < pair[1].start());
            }

            for bucket in &buckets {
                assert!(bucket
                    .readings()
                    .iter()
                    .all(|r| time::truncate_to_hour(r.timestamp) == bucket.start()));
            }
        }
    }
}
