use super::{QModelConfig, HIDDEN_UNITS};
use crate::{
    mlp::{Mlp, MlpConfig},
    QInput, SubModel,
};
use crossing_core::{MasterLayout, LOCAL_DIM, N_ACTIONS};
use serde::{Deserialize, Serialize};
use tch::{nn::VarStore, Tensor};

/// Configuration of [`JointQ`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct JointQConfig {
    /// Embedding of the master input, ReLU-activated.
    pub master: MlpConfig,

    /// Network applied to the embedding concatenated with the local features.
    pub head: MlpConfig,
}

impl JointQConfig {
    /// Default configuration for the given master layout.
    ///
    /// The master input passes `dim -> 16 -> 8 -> 2`; the embedding and the
    /// local features pass `11 -> 16 -> 8 -> 2`.
    pub fn new(layout: MasterLayout) -> Self {
        let master = MlpConfig::new(layout.dim() as _, HIDDEN_UNITS.to_vec(), N_ACTIONS as _)
            .name("master")
            .activation_out(true);
        let head = MlpConfig::new(
            (N_ACTIONS + LOCAL_DIM) as _,
            HIDDEN_UNITS.to_vec(),
            N_ACTIONS as _,
        )
        .name("head");
        Self { master, head }
    }
}

impl Default for JointQConfig {
    fn default() -> Self {
        Self::new(MasterLayout::default())
    }
}

impl QModelConfig for JointQConfig {
    fn master_dim(&self) -> Option<i64> {
        Some(self.master.in_dim())
    }

    fn out_dim(&self) -> i64 {
        self.head.out_dim()
    }
}

/// Q-network of the joint topology.
///
/// The master input is embedded, concatenated with the local features of the
/// vehicle and mapped to action values.
pub struct JointQ {
    master: Mlp,
    head: Mlp,
}

impl SubModel for JointQ {
    type Config = JointQConfig;
    type Input = QInput;
    type Output = Tensor;

    fn build(var_store: &VarStore, config: Self::Config) -> Self {
        Self {
            master: Mlp::build(var_store, config.master),
            head: Mlp::build(var_store, config.head),
        }
    }

    fn clone_with_var_store(&self, var_store: &VarStore) -> Self {
        Self {
            master: self.master.clone_with_var_store(var_store),
            head: self.head.clone_with_var_store(var_store),
        }
    }

    /// # Panics
    ///
    /// Panics if the master input is missing. [`QNet`](super::QNet) checks
    /// inputs before the forward pass.
    fn forward(&self, input: &Self::Input) -> Self::Output {
        let joint = input
            .joint
            .as_ref()
            .expect("the joint Q-network needs the master input");
        let embedding = self.master.forward(joint);
        let local = input.local.to(embedding.device());
        self.head.forward(&Tensor::cat(&[embedding, local], -1))
    }
}
