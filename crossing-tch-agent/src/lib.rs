//! Action-value networks implemented with [tch](https://crates.io/crates/tch).
//!
//! [`QNet`] implements [`crossing_core::ValueFunction`] for both topologies:
//! [`LocalQ`] reads the local features of a vehicle and [`JointQ`] embeds the
//! master input before combining it with the local features.
mod device;
pub mod mlp;
mod model;
mod opt;
pub mod qnet;
pub mod util;
pub use device::DeviceConfig;
pub use model::{QInput, SubModel};
pub use opt::{Optimizer, OptimizerConfig};
pub use qnet::{JointQ, JointQConfig, LocalQ, QNet, QNetConfig};
