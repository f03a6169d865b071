use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "mlp".to_string()
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    /// Name of the variables of the network in the [`VarStore`](tch::nn::VarStore).
    #[serde(default = "default_name")]
    pub(super) name: String,
    pub(super) in_dim: i64,
    pub(super) units: Vec<i64>,
    pub(super) out_dim: i64,
    pub(super) activation_out: bool,
}

impl MlpConfig {
    /// Creates a configuration with a linear output layer.
    pub fn new(in_dim: i64, units: Vec<i64>, out_dim: i64) -> Self {
        Self {
            name: default_name(),
            in_dim,
            units,
            out_dim,
            activation_out: false,
        }
    }

    /// Sets the name of the variables of the network.
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    /// Applies ReLU to the output layer.
    pub fn activation_out(mut self, v: bool) -> Self {
        self.activation_out = v;
        self
    }

    /// Input dimension.
    pub fn in_dim(&self) -> i64 {
        self.in_dim
    }

    /// Output dimension.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }
}
