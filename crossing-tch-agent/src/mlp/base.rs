use super::MlpConfig;
use crate::model::SubModel;
use tch::{nn, nn::Module, Device, Tensor};

/// Multilayer perceptron with ReLU activation function.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    seq: nn::Sequential,
}

impl Mlp {
    fn create_net(var_store: &nn::VarStore, config: &MlpConfig) -> nn::Sequential {
        let p = &(var_store.root() / config.name.as_str());
        let mut seq = nn::seq();
        let mut in_dim = config.in_dim;

        for (i, &out_dim) in config.units.iter().enumerate() {
            seq = seq.add(nn::linear(
                p / format!("{}{}", "ln", i),
                in_dim,
                out_dim,
                Default::default(),
            ));
            seq = seq.add_fn(|x| x.relu());
            in_dim = out_dim;
        }

        seq = seq.add(nn::linear(
            p / format!("{}{}", "ln", config.units.len()),
            in_dim,
            config.out_dim,
            Default::default(),
        ));

        if config.activation_out {
            seq = seq.add_fn(|x| x.relu());
        }

        seq
    }

    /// Configuration of the network.
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }
}

impl SubModel for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Tensor {
        self.seq.forward(&x.to(self.device))
    }

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        let device = var_store.device();
        let seq = Self::create_net(var_store, &config);

        Self {
            config,
            device,
            seq,
        }
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        Self::build(var_store, self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mlp_shapes_and_names() {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = MlpConfig::new(9, vec![16, 8], 2).name("q");
        let mlp = Mlp::build(&vs, config);
        let y = mlp.forward(&Tensor::zeros([5, 9], (tch::Kind::Float, Device::Cpu)));
        assert_eq!(y.size(), vec![5, 2]);

        let mut names = vs.variables().into_keys().collect::<Vec<_>>();
        names.sort();
        assert_eq!(
            names,
            vec![
                "q.ln0.bias",
                "q.ln0.weight",
                "q.ln1.bias",
                "q.ln1.weight",
                "q.ln2.bias",
                "q.ln2.weight"
            ]
        );
    }

    #[test]
    fn test_activation_out_is_nonnegative() {
        let vs = nn::VarStore::new(Device::Cpu);
        let mlp = Mlp::build(&vs, MlpConfig::new(3, vec![4], 6).activation_out(true));
        let y = mlp.forward(&Tensor::randn([10, 3], (tch::Kind::Float, Device::Cpu)));
        let min = f32::try_from(y.min()).unwrap();
        assert!(min >= 0.0);
    }
}
