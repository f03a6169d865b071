//! Configuration of a run of the `crossing` binary.
use anyhow::Result;
use crossing_core::ExperimentConfig;
use crossing_tch_agent::{DeviceConfig, OptimizerConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Experiment and Q-network settings read from a YAML file.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct RunConfig {
    /// Episode loop, exploration, training, reward and simulator.
    pub experiment: ExperimentConfig,

    /// Optimizer of the Q-networks.
    pub optimizer: OptimizerConfig,

    /// Device of the Q-networks.
    pub device: DeviceConfig,
}

impl RunConfig {
    /// Constructs [`RunConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RunConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossing_core::{CoordinatorConfig, MasterLayout};
    use tempdir::TempDir;

    #[test]
    fn test_serde_run_config() -> Result<()> {
        let config = RunConfig {
            experiment: ExperimentConfig::default()
                .coordinator(CoordinatorConfig::default().max_episodes(50))
                .master_layout(MasterLayout::Concatenated),
            optimizer: OptimizerConfig::default().learning_rate(0.01),
            device: DeviceConfig::Cpu,
        };
        let dir = TempDir::new("run_config")?;
        let path = dir.path().join("run_config.yaml");
        config.save(&path)?;
        assert_eq!(RunConfig::load(&path)?, config);
        Ok(())
    }
}
