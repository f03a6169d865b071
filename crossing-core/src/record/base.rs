//! Record and its values.
use crate::error::CrossingError;
use chrono::prelude::{DateTime, Local};
use std::collections::{
    hash_map::{IntoIter, Iter, Keys},
    HashMap,
};

/// Value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single value such as a loss or a reward.
    Scalar(f32),

    /// A timestamp.
    DateTime(DateTime<Local>),

    /// A 1-dimensional array, e.g. the action values of a state.
    Array1(Vec<f32>),

    /// A text value, e.g. the outcome of an episode.
    String(String),
}

/// Key-value pairs describing a training event.
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record holding a single scalar.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Keys of the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a value, replacing the previous one of the same key.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Iterates over key-value pairs.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Consumes the record, iterating over key-value pairs.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Value of the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records. Values of `record` win on shared keys.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges `record` into this one. Values of `record` win on shared keys.
    pub fn merge_inplace(&mut self, record: Record) {
        self.0.extend(record.0);
    }

    /// Scalar of the given key.
    pub fn get_scalar(&self, k: &str) -> Result<f32, CrossingError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(CrossingError::RecordValueTypeError("Scalar".to_string())),
            None => Err(CrossingError::RecordKeyError(k.to_string())),
        }
    }

    /// 1-dimensional array of the given key.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, CrossingError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(CrossingError::RecordValueTypeError("Array1".to_string())),
            None => Err(CrossingError::RecordKeyError(k.to_string())),
        }
    }

    /// String of the given key.
    pub fn get_string(&self, k: &str) -> Result<String, CrossingError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(CrossingError::RecordValueTypeError("String".to_string())),
            None => Err(CrossingError::RecordKeyError(k.to_string())),
        }
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record holds no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let mut r = Record::from_scalar("loss", 0.5);
        r.insert("outcome", RecordValue::String("goal_reached".into()));
        assert_eq!(r.get_scalar("loss").unwrap(), 0.5);
        assert_eq!(r.get_string("outcome").unwrap(), "goal_reached");
        assert!(matches!(
            r.get_scalar("outcome"),
            Err(CrossingError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            r.get_array1("q"),
            Err(CrossingError::RecordKeyError(k)) if k == "q"
        ));
    }

    #[test]
    fn test_merge_prefers_argument() {
        let a = Record::from_slice(&[
            ("x", RecordValue::Scalar(1.0)),
            ("y", RecordValue::Scalar(2.0)),
        ]);
        let b = Record::from_scalar("y", 3.0);
        let m = a.merge(b);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get_scalar("y").unwrap(), 3.0);
    }
}
