//! Value function approximator.
use super::{InputBatch, QBatch};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Action-value function approximator.
///
/// Given a batch of inputs, it returns one value per action for every row.
/// Parameters are owned by the implementor and only mutated through
/// [`ValueFunction::fit_step`].
///
/// `Clone` must produce an independent copy of the parameters. The copy is
/// used as the frozen network in alternating training.
pub trait ValueFunction: Clone {
    /// Predicts action values. Parameters are not changed.
    fn predict(&self, input: &InputBatch) -> Result<QBatch>;

    /// Performs one optimization step toward `target` and returns the loss.
    fn fit_step(&mut self, input: &InputBatch, target: &QBatch) -> Result<f32>;

    /// Saves the parameters to the given file.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters from the given file.
    fn load_params(&mut self, path: &Path) -> Result<()>;

    /// Returns statistics of the parameters for recording.
    fn param_stats(&self) -> Record {
        Record::empty()
    }
}
