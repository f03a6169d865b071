//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Discount factor of the Bellman target.
    pub discount_factor: f32,

    /// Step size of the soft update toward the Bellman target.
    ///
    /// This is not the learning rate of the optimizer of the approximator.
    pub td_learning_rate: f32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.95,
            td_learning_rate: 0.003,
        }
    }
}

impl TrainerConfig {
    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the step size of the soft update.
    pub fn td_learning_rate(mut self, v: f32) -> Self {
        self.td_learning_rate = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
