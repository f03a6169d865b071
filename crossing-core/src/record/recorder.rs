use super::Record;

/// Writes a record to an output destination.
pub trait Recorder {
    /// Writes a record. Failures are logged, never returned.
    fn write(&mut self, record: Record);
}

/// A recorder that stores records and writes their aggregation on
/// [`AggregateRecorder::flush`].
pub trait AggregateRecorder {
    /// Stores a record.
    fn store(&mut self, record: Record);

    /// Writes the aggregation of the stored records at the given step, then
    /// drops them.
    fn flush(&mut self, step: i64);
}
