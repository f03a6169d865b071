//! Core interfaces.
mod action;
mod batch;
mod simulator;
mod value_function;
pub use action::{Action, N_ACTIONS};
pub use batch::{InputBatch, QBatch, RowBatch};
pub use simulator::{Simulator, Telemetry, VehicleControls, VehicleId};
pub use value_function::ValueFunction;
