//! Configuration of an experiment.
use crate::{
    sim::KinematicSimConfig, CoordinatorConfig, EpsilonGreedyConfig, MasterLayout, RewardConfig,
    TrainerConfig,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of all components of a run.
///
/// Missing sections take their default values when loaded from YAML.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Episode loop.
    pub coordinator: CoordinatorConfig,

    /// Exploration.
    pub explorer: EpsilonGreedyConfig,

    /// Temporal-difference update.
    pub trainer: TrainerConfig,

    /// Reward constants.
    pub reward: RewardConfig,

    /// Kinematic simulator.
    pub sim: KinematicSimConfig,

    /// Layout of the master input of the joint topology.
    pub master_layout: MasterLayout,
}

impl ExperimentConfig {
    /// Sets the configuration of the episode loop.
    pub fn coordinator(mut self, v: CoordinatorConfig) -> Self {
        self.coordinator = v;
        self
    }

    /// Sets the configuration of exploration.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the configuration of the temporal-difference update.
    pub fn trainer(mut self, v: TrainerConfig) -> Self {
        self.trainer = v;
        self
    }

    /// Sets the reward constants.
    pub fn reward(mut self, v: RewardConfig) -> Self {
        self.reward = v;
        self
    }

    /// Sets the configuration of the kinematic simulator.
    pub fn sim(mut self, v: KinematicSimConfig) -> Self {
        self.sim = v;
        self
    }

    /// Sets the layout of the master input.
    pub fn master_layout(mut self, v: MasterLayout) -> Self {
        self.master_layout = v;
        self
    }

    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RandomActionMode, TrainOption};
    use tempdir::TempDir;

    #[test]
    fn test_serde_experiment_config() -> Result<()> {
        let config = ExperimentConfig::default()
            .coordinator(
                CoordinatorConfig::default()
                    .max_episodes(20)
                    .train_option(TrainOption::BatchOfTrajectories { episodes: 10 })
                    .alternate(5)
                    .load_weights("experiments/local_experiment/weights/epochs_0_100"),
            )
            .explorer(
                EpsilonGreedyConfig::default()
                    .eps_min(0.05)
                    .random_action(RandomActionMode::Independent)
                    .seed(42),
            )
            .reward(RewardConfig::default().goal(500.0, 12.0))
            .master_layout(MasterLayout::Concatenated);

        let dir = TempDir::new("experiment_config")?;
        let path = dir.path().join("experiment_config.yaml");
        config.save(&path)?;
        let config_ = ExperimentConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_partial_yaml_uses_defaults() -> Result<()> {
        let yaml = "coordinator:\n  max_episodes: 3\n  max_steps: 10\n  train_option: Step\n  alternate: false\n  alternate_period: 100\n  settle_delay_ms: 0\n  experiment_id: e\n  weights_root: ~\n  tag: t\n  save_interval: 1\n  load_weights: ~\n  record_param_stats_interval: 1\n";
        let config: ExperimentConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config.coordinator.train_option, TrainOption::Step);
        assert_eq!(config.trainer, TrainerConfig::default());
        assert_eq!(config.master_layout, MasterLayout::Compact);
        Ok(())
    }
}
