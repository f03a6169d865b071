use super::{QModelConfig, HIDDEN_UNITS};
use crate::{
    mlp::{Mlp, MlpConfig},
    QInput, SubModel,
};
use crossing_core::{LOCAL_DIM, N_ACTIONS};
use tch::{nn::VarStore, Tensor};

/// Q-network of the independent topology, reading the local features only.
pub struct LocalQ {
    mlp: Mlp,
}

impl LocalQ {
    /// Default configuration, `9 -> 16 -> 8 -> 2`.
    pub fn default_config() -> MlpConfig {
        MlpConfig::new(LOCAL_DIM as _, HIDDEN_UNITS.to_vec(), N_ACTIONS as _).name("q")
    }
}

impl QModelConfig for MlpConfig {
    fn master_dim(&self) -> Option<i64> {
        None
    }

    fn out_dim(&self) -> i64 {
        MlpConfig::out_dim(self)
    }
}

impl SubModel for LocalQ {
    type Config = MlpConfig;
    type Input = QInput;
    type Output = Tensor;

    fn build(var_store: &VarStore, config: Self::Config) -> Self {
        Self {
            mlp: Mlp::build(var_store, config),
        }
    }

    fn clone_with_var_store(&self, var_store: &VarStore) -> Self {
        Self {
            mlp: self.mlp.clone_with_var_store(var_store),
        }
    }

    fn forward(&self, input: &Self::Input) -> Self::Output {
        self.mlp.forward(&input.local)
    }
}
