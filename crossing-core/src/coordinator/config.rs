//! Configuration of [`Coordinator`](super::Coordinator).
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// When the value functions are trained.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum TrainOption {
    /// After every step, on the transitions of that step.
    Step,

    /// At the end of every episode, on its whole trajectory.
    Trajectory,

    /// Every `episodes` episodes, on the concatenation of their trajectories.
    BatchOfTrajectories {
        /// Number of trajectories per training call.
        episodes: usize,
    },
}

impl Default for TrainOption {
    fn default() -> Self {
        Self::Trajectory
    }
}

/// Configuration of [`Coordinator`](super::Coordinator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CoordinatorConfig {
    /// The number of episodes of a run.
    pub max_episodes: usize,

    /// The maximum number of steps of an episode.
    pub max_steps: usize,

    /// When the value functions are trained.
    pub train_option: TrainOption,

    /// The vehicles take turns in training, the other one acting with frozen
    /// parameters.
    pub alternate: bool,

    /// Interval of handing training over to the other vehicle, in episodes.
    pub alternate_period: usize,

    /// Time given to the simulator after new controls, in milliseconds.
    pub settle_delay_ms: u64,

    /// Identifier of the experiment, part of the snapshot path.
    pub experiment_id: String,

    /// Root directory of snapshots. Nothing is saved if `None`.
    pub weights_root: Option<PathBuf>,

    /// Name of the snapshot saved by the run.
    pub tag: String,

    /// Interval of saving snapshots in episodes. A snapshot is also saved at
    /// the end of the run.
    pub save_interval: usize,

    /// Snapshot directory loaded before the first episode.
    pub load_weights: Option<PathBuf>,

    /// Interval of recording parameter statistics in episodes.
    pub record_param_stats_interval: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_episodes: 10000,
            max_steps: 500,
            train_option: TrainOption::Trajectory,
            alternate: false,
            alternate_period: 100,
            settle_delay_ms: 100,
            experiment_id: "global_experiment".to_string(),
            weights_root: Some(PathBuf::from("experiments")),
            tag: "epochs_0_100".to_string(),
            save_interval: usize::MAX,
            load_weights: None,
            record_param_stats_interval: usize::MAX,
        }
    }
}

impl CoordinatorConfig {
    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the maximum number of steps of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets when the value functions are trained.
    pub fn train_option(mut self, v: TrainOption) -> Self {
        self.train_option = v;
        self
    }

    /// Enables alternating training with the given period in episodes.
    pub fn alternate(mut self, period: usize) -> Self {
        self.alternate = true;
        self.alternate_period = period;
        self
    }

    /// Sets the settle delay in milliseconds.
    pub fn settle_delay_ms(mut self, v: u64) -> Self {
        self.settle_delay_ms = v;
        self
    }

    /// Sets the experiment identifier.
    pub fn experiment_id(mut self, v: impl Into<String>) -> Self {
        self.experiment_id = v.into();
        self
    }

    /// Sets the root directory of snapshots, `None` disables saving.
    pub fn weights_root(mut self, v: Option<PathBuf>) -> Self {
        self.weights_root = v;
        self
    }

    /// Sets the name of the saved snapshot.
    pub fn tag(mut self, v: impl Into<String>) -> Self {
        self.tag = v.into();
        self
    }

    /// Sets the interval of saving snapshots in episodes.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the snapshot loaded at the start of the run.
    pub fn load_weights(mut self, v: impl Into<PathBuf>) -> Self {
        self.load_weights = Some(v.into());
        self
    }

    /// Sets the interval of recording parameter statistics in episodes.
    pub fn record_param_stats_interval(mut self, v: usize) -> Self {
        self.record_param_stats_interval = v;
        self
    }

    /// Settle delay.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
