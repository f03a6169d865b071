#![warn(missing_docs)]
//! Decision and training loop for two vehicles learning to cross an intersection.
//!
//! The crate turns simulator telemetry into feature vectors, picks throttle
//! actions with an epsilon-greedy policy over a learned action-value function,
//! accumulates transitions into per-episode trajectories and applies a soft
//! temporal-difference update to the value function.
//!
//! The simulator ([`Simulator`]) and the function approximator ([`ValueFunction`])
//! are collaborators given from outside. [`sim::KinematicSim`] is a small
//! deterministic simulator usable without an external process.
pub mod error;
pub mod record;
pub mod sim;

mod base;
pub use base::{
    Action, InputBatch, QBatch, RowBatch, Simulator, Telemetry, ValueFunction, VehicleControls,
    VehicleId, N_ACTIONS,
};

mod featurizer;
pub use featurizer::{
    keys, FeatureVector, JointFeatureVector, MasterLayout, StateFeaturizer, GLOBAL_DIM, LOCAL_DIM,
};

mod reward;
pub use reward::{Reward, RewardConfig, RewardShaper};

mod explorer;
pub use explorer::{Decision, EpsilonGreedy, EpsilonGreedyConfig, PolicyState, RandomActionMode};

mod trajectory;
pub use trajectory::{
    deinterleave, reinterleave, AgentObs, Columns, TaggedTransition, TrajectoryStore, Transition,
};

mod topology;
pub use topology::{IndependentTopology, JointTopology, Topology};

mod trainer;
pub use trainer::{soft_td_update, QNetworks, Trainer, TrainerConfig};

mod coordinator;
pub use coordinator::{
    Coordinator, CoordinatorConfig, EpisodeOutcome, EpisodeSummary, RunStats, StepOutcome,
    TrainOption,
};

mod config;
pub use config::ExperimentConfig;

pub mod dummy;
pub mod util;
