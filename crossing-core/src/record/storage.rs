//! Aggregation of stored records.
use super::{Record, RecordValue};
use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3Builder;

/// Stores records and aggregates them on demand.
///
/// A key seen in a single record keeps its value. Scalars seen in several
/// records are summarized as `<key>_min`, `<key>_max`, `<key>_mean` and
/// `<key>_median`. For any other value type the most recent value wins.
#[derive(Debug, Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::INFINITY, f32::min)
}

fn max(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn mean(vs: &[f32]) -> f32 {
    vs.iter().sum::<f32>() / vs.len() as f32
}

fn median(mut vs: Vec<f32>) -> f32 {
    vs.sort_by(|x, y| x.total_cmp(y));
    vs[vs.len() / 2]
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// The number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            keys.extend(record.keys().cloned());
        }
        keys
    }

    fn aggregate_key(&self, key: &str) -> Record {
        let values: Vec<&RecordValue> = self.data.iter().filter_map(|r| r.get(key)).collect();
        let scalars: Vec<f32> = values
            .iter()
            .filter_map(|v| match v {
                RecordValue::Scalar(x) => Some(*x),
                _ => None,
            })
            .collect();

        if scalars.len() > 1 && scalars.len() == values.len() {
            Record::from_slice(&[
                (format!("{}_min", key), RecordValue::Scalar(min(&scalars))),
                (format!("{}_max", key), RecordValue::Scalar(max(&scalars))),
                (format!("{}_mean", key), RecordValue::Scalar(mean(&scalars))),
                (format!("{}_median", key), RecordValue::Scalar(median(scalars))),
            ])
        } else {
            match values.last() {
                Some(&v) => Record::from_slice(&[(key, v.clone())]),
                None => Record::empty(),
            }
        }
    }

    /// Aggregates the stored records and drops them.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();
        for key in self.keys().iter() {
            record.merge_inplace(self.aggregate_key(key));
        }
        self.data.clear();
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate() {
        let mut storage = RecordStorage::new();
        for (i, loss) in [4.0, 1.0, 2.0].iter().enumerate() {
            let mut r = Record::from_scalar("loss", *loss);
            r.insert("outcome", RecordValue::String(format!("o{}", i)));
            storage.store(r);
        }
        storage.store(Record::from_scalar("epsilon", 0.5));

        let r = storage.aggregate();
        assert!(storage.is_empty());
        assert_eq!(r.get_scalar("loss_min").unwrap(), 1.0);
        assert_eq!(r.get_scalar("loss_max").unwrap(), 4.0);
        assert_eq!(r.get_scalar("loss_median").unwrap(), 2.0);
        assert!((r.get_scalar("loss_mean").unwrap() - 7.0 / 3.0).abs() < 1e-6);
        assert_eq!(r.get_scalar("epsilon").unwrap(), 0.5);
        assert_eq!(r.get_string("outcome").unwrap(), "o2");
    }
}
