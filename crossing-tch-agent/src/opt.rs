//! Optimizer of the Q-networks.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tch::{
    nn::{Adam, Optimizer as Optimizer_, OptimizerConfig as _, VarStore},
    Tensor,
};

/// Configures the Adam optimizer of a Q-network.
///
/// The learning rate applies to gradient steps on the regression loss. It is
/// independent of the rate of the soft temporal-difference update that
/// produces the regression targets.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OptimizerConfig {
    /// Learning rate.
    pub lr: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { lr: 0.003 }
    }
}

impl OptimizerConfig {
    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.lr = v;
        self
    }

    /// Constructs an optimizer over the variables of `vs`.
    pub fn build(&self, vs: &VarStore) -> Result<Optimizer> {
        let opt = Adam::default().build(vs, self.lr)?;
        Ok(Optimizer { opt, n_steps: 0 })
    }
}

/// Adam optimizer of a Q-network, counting its steps.
pub struct Optimizer {
    opt: Optimizer_,
    n_steps: usize,
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) {
        self.opt.backward_step(loss);
        self.n_steps += 1;
    }

    /// The number of steps taken.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }
}
