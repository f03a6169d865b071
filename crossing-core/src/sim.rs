//! Simulators shipped with the crate.
mod kinematic;
pub use kinematic::{KinematicSim, KinematicSimConfig};
