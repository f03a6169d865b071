//! Errors in the library.
use crate::VehicleId;
use thiserror::Error;

/// Errors in the library.
///
/// Every variant raised while stepping the simulator or training is fatal for
/// the current episode. The coordinator aborts the episode, discards its
/// trajectory and moves on; nothing is retried.
#[derive(Error, Debug)]
pub enum CrossingError {
    /// A telemetry key required by the featurizer is absent.
    #[error("Missing telemetry field: {key}")]
    MissingField {
        /// Name of the absent key.
        key: String,
    },

    /// Failure reported by the simulator collaborator.
    #[error("Simulator error: {0}")]
    Simulator(#[source] anyhow::Error),

    /// Failure reported by the value function approximator, unchanged.
    #[error("Approximator error: {0}")]
    Approximator(#[source] anyhow::Error),

    /// A Bellman target was NaN or infinite.
    #[error("Non-finite TD target at row {row}")]
    NonFiniteTarget {
        /// Row of the batch holding the target.
        row: usize,
    },

    /// Regrouped rows do not cover every index exactly once.
    #[error("Row {row} is missing or duplicated after regrouping {n} rows")]
    RowCoverage {
        /// First offending row.
        row: usize,
        /// The number of rows expected.
        n: usize,
    },

    /// The approximator produced an action index outside of the action set.
    #[error("Action index out of range: {0}")]
    InvalidAction(usize),

    /// The observation does not carry the inputs required by the topology.
    #[error("Observation does not match topology {0}")]
    TopologyMismatch(&'static str),

    /// A transition was pushed out of step order.
    #[error("Transition of {vehicle:?} at step {step} pushed after step {last}")]
    OutOfOrder {
        /// Vehicle of the rejected transition.
        vehicle: VehicleId,
        /// Step index of the rejected transition.
        step: usize,
        /// Step index of the last stored transition.
        last: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

impl CrossingError {
    /// Returns `true` if the error comes from missing or unreadable simulator state.
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::Simulator(_))
    }
}
