use crate::Reading;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct HeapItem(usize, Reading);

impl Eq for HeapItem {}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        (self.0, self.1.timestamp).eq(&(other.0, other.1.timestamp))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    // NOTE: Reversed, so the max-heap pops the oldest reading first
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .1
            .timestamp
            .cmp(&self.1.timestamp)
            .then_with(|| other.0.cmp(&self.0))
    }
}

macro_rules! fail_iter {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        }
    };
}

/// Merges per-device reading streams, each sorted by timestamp,
/// into one stream sorted by timestamp.
pub struct Merger<I: Iterator<Item = crate::Result<Reading>>> {
    readers: Vec<I>,
    heap: BinaryHeap<HeapItem>,
    is_initialized: bool,
}

impl<I: Iterator<Item = crate::Result<Reading>>> Merger<I> {
    pub fn new(readers: Vec<I>) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(readers.len()),
            readers,
            is_initialized: false,
        }
    }

    fn advance(&mut self, idx: usize) -> crate::Result<()> {
        if let Some(reader) = self.readers.get_mut(idx) {
            if let Some(item) = reader.next() {
                self.heap.push(HeapItem(idx, item?));
            }
        }
        Ok(())
    }
}

impl<I: Iterator<Item = crate::Result<Reading>>> Iterator for Merger<I> {
    type Item = crate::Result<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.is_initialized {
            for i in 0..self.readers.len() {
                fail_iter!(self.advance(i));
            }
            self.is_initialized = true;
        }

        let head = self.heap.pop()?;

        fail_iter!(self.advance(head.0));

        Some(Ok(head.1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, Utc};
    use test_log::test;

    fn stream(device: &str, minutes: &[i64]) -> std::vec::IntoIter<crate::Result<Reading>> {
        let base: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();

        minutes
            .iter()
            .map(|&m| Ok(Reading::new(device, base + TimeDelta::minutes(m))))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn merge_by_timestamp() -> crate::Result<()> {
        let merger = Merger::new(vec![
            stream("a", &[1, 4, 9]),
            stream("b", &[2, 3, 10]),
            stream("c", &[]),
            stream("d", &[0, 5]),
        ]);

        let merged = merger.collect::<crate::Result<Vec<_>>>()?;

        let devices = merged.iter().map(|r| r.device_id.as_str()).collect::<String>();
        assert_eq!("dabbadab", devices);

        Ok(())
    }

    #[test]
    fn merge_surfaces_errors() {
        let failing: Vec<crate::Result<Reading>> =
            vec![Err(crate::Error::from(std::io::Error::other("boom")))];
        let mut merger = Merger::new(vec![failing.into_iter()]);

        assert!(matches!(merger.next(), Some(Err(_))));
    }
}
