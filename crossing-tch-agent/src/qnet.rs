//! Q-networks of the two topologies.
mod base;
mod config;
mod joint;
mod local;
pub use base::QNet;
pub use config::{QModelConfig, QNetConfig};
pub use joint::{JointQ, JointQConfig};
pub use local::LocalQ;

/// Hidden units of both the local network and the two stages of the joint network.
pub const HIDDEN_UNITS: [i64; 2] = [16, 8];
