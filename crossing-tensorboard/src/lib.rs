//! Writes records of the crossing loop to TFRecord files read by TensorBoard.
use crossing_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::{trace, warn};
use std::{
    fs,
    panic::{catch_unwind, AssertUnwindSafe},
    path::Path,
};
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Writing never stops the caller. If the log directory cannot be created or
/// the writer fails, the recorder logs a warning and drops every later record.
pub struct TensorboardRecorder {
    writer: Option<SummaryWriter>,
    step_key: String,
    storage: RecordStorage,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`. Records are written at the step
    /// found under the key `step`, which [`AggregateRecorder::flush`] sets to
    /// the episode number.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        let logdir = logdir.as_ref();
        let writer = match fs::create_dir_all(logdir) {
            Err(e) => {
                warn!("Cannot create {:?}, records are dropped: {}", logdir, e);
                None
            }
            Ok(()) => match catch_unwind(|| SummaryWriter::new(logdir)) {
                Ok(writer) => Some(writer),
                Err(_) => {
                    warn!("Cannot open an event file in {:?}, records are dropped", logdir);
                    None
                }
            },
        };

        Self {
            writer,
            step_key: "step".to_string(),
            storage: RecordStorage::new(),
        }
    }

    /// Returns `true` while records are written.
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Only [`RecordValue::Scalar`] values are written. A record without a
    /// scalar step is dropped with a warning.
    fn write(&mut self, record: Record) {
        let writer = match self.writer.as_mut() {
            Some(writer) => writer,
            None => return,
        };
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) if *v >= 0.0 => *v as usize,
            _ => {
                warn!("Record without a valid `{}` is dropped", self.step_key);
                return;
            }
        };

        let step_key = &self.step_key;
        let written = catch_unwind(AssertUnwindSafe(|| {
            for (k, v) in record.iter() {
                if k != step_key {
                    match v {
                        RecordValue::Scalar(v) => writer.add_scalar(k, *v, step),
                        RecordValue::DateTime(_) => {} // discard value
                        _ => trace!("Skip non-scalar value of {}", k),
                    };
                }
            }
            writer.flush();
        }));
        if written.is_err() {
            warn!("Event writer failed at step {}, later records are dropped", step);
            self.writer = None;
        }
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let mut record = self.storage.aggregate();
        if !record.is_empty() {
            record.insert(self.step_key.clone(), RecordValue::Scalar(step as f32));
            self.write(record);
        }
    }
}
