//! Records of training metrics and the recorders they are written to.
//!
//! A [`Record`] maps string keys to [`RecordValue`]s. The coordinator builds one
//! record per episode (reward, steps, epsilon, loss, outcome) and one per
//! training call, and hands them to an [`AggregateRecorder`].
//!
//! ```rust
//! use crossing_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("episode_reward", -0.3);
//! record.insert("outcome", RecordValue::String("collided".to_string()));
//! assert_eq!(record.get_scalar("episode_reward").unwrap(), -0.3);
//! ```
//!
//! Recorders never fail: an implementation that cannot write logs a warning
//! and drops the record.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
