use crate::{DeviceConfig, OptimizerConfig};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Shape information of the configuration of a Q-network.
pub trait QModelConfig {
    /// Width of the master input, `None` if the network reads local features only.
    fn master_dim(&self) -> Option<i64>;

    /// The number of action values.
    fn out_dim(&self) -> i64;
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`QNet`](super::QNet).
pub struct QNetConfig<C> {
    pub(super) q_config: C,

    #[serde(default)]
    pub(super) opt_config: OptimizerConfig,

    #[serde(default)]
    pub(super) device: DeviceConfig,
}

impl<C> QNetConfig<C>
where
    C: DeserializeOwned + Serialize + QModelConfig,
{
    /// Creates a configuration with Adam at learning rate 0.003 on CPU.
    pub fn new(q_config: C) -> Self {
        Self {
            q_config,
            opt_config: OptimizerConfig::default(),
            device: DeviceConfig::default(),
        }
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: DeviceConfig) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`QNetConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QNetConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
