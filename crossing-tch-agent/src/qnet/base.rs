use super::{QModelConfig, QNetConfig};
use crate::{
    opt::{Optimizer, OptimizerConfig},
    util::{batch_to_tensor, copy_vars, input_to_tensors, param_stats, tensor_to_batch},
    QInput, SubModel,
};
use anyhow::{bail, Result};
use crossing_core::{record::Record, InputBatch, QBatch, ValueFunction};
use log::{info, trace};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tch::{nn, no_grad, Device, Tensor};

/// Action-value network backed by a [`VarStore`](nn::VarStore).
///
/// Cloning gives a network with its own copy of the parameters and a fresh
/// optimizer, which is how the frozen network of alternating training is made.
pub struct QNet<Q>
where
    Q: SubModel<Input = QInput, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + QModelConfig + Clone,
{
    device: Device,
    var_store: nn::VarStore,
    q: Q,
    q_config: Q::Config,
    opt_config: OptimizerConfig,

    // Built on the first fit step.
    opt: Option<Optimizer>,
}

impl<Q> QNet<Q>
where
    Q: SubModel<Input = QInput, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + QModelConfig + Clone,
{
    /// Constructs a Q-network with randomly initialized parameters.
    pub fn build(config: QNetConfig<Q::Config>) -> Self {
        let device: Device = config.device.into();
        let var_store = nn::VarStore::new(device);
        let q = Q::build(&var_store, config.q_config.clone());

        Self {
            device,
            var_store,
            q,
            q_config: config.q_config,
            opt_config: config.opt_config,
            opt: None,
        }
    }

    /// Device of the parameters.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Returns `var_store`.
    pub fn get_var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    fn check_input(&self, input: &InputBatch) -> Result<()> {
        match (self.q_config.master_dim(), &input.joint) {
            (None, _) => {}
            (Some(_), None) => bail!("The Q-network needs the master input"),
            (Some(dim), Some(joint)) => {
                if joint.dim() as i64 != dim {
                    bail!("Master input has {} columns, expected {}", joint.dim(), dim);
                }
                if joint.len() != input.local.len() {
                    bail!(
                        "Master input has {} rows, local input has {}",
                        joint.len(),
                        input.local.len()
                    );
                }
            }
        }
        Ok(())
    }

    /// The number of optimizer steps since construction or cloning.
    pub fn n_fit_steps(&self) -> usize {
        self.opt.as_ref().map_or(0, |opt| opt.n_steps())
    }

    /// Outputs the action values given an input.
    pub fn forward(&self, input: &QInput) -> Tensor {
        let q = self.q.forward(input);
        debug_assert_eq!(q.size().as_slice()[1], self.q_config.out_dim());
        q
    }
}

impl<Q> Clone for QNet<Q>
where
    Q: SubModel<Input = QInput, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + QModelConfig + Clone,
{
    fn clone(&self) -> Self {
        let var_store = nn::VarStore::new(self.device);
        let q = self.q.clone_with_var_store(&var_store);
        copy_vars(&var_store, &self.var_store);

        Self {
            device: self.device,
            var_store,
            q,
            q_config: self.q_config.clone(),
            opt_config: self.opt_config.clone(),
            opt: None,
        }
    }
}

impl<Q> ValueFunction for QNet<Q>
where
    Q: SubModel<Input = QInput, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + QModelConfig + Clone,
{
    fn predict(&self, input: &InputBatch) -> Result<QBatch> {
        self.check_input(input)?;
        if input.is_empty() {
            return Ok(QBatch::new(self.q_config.out_dim() as usize));
        }
        let input = input_to_tensors(input, self.device);
        let q = no_grad(|| self.forward(&input));
        tensor_to_batch(&q)
    }

    fn fit_step(&mut self, input: &InputBatch, target: &QBatch) -> Result<f32> {
        self.check_input(input)?;
        if input.is_empty() {
            bail!("Cannot fit on an empty batch");
        }
        if target.len() != input.len() || target.dim() as i64 != self.q_config.out_dim() {
            bail!(
                "Target of {}x{} does not match {} rows of {} action values",
                target.len(),
                target.dim(),
                input.len(),
                self.q_config.out_dim()
            );
        }

        if self.opt.is_none() {
            self.opt = Some(self.opt_config.build(&self.var_store)?);
        }

        let input = input_to_tensors(input, self.device);
        let target = batch_to_tensor(target, self.device);
        let pred = self.forward(&input);
        let loss = pred.mse_loss(&target, tch::Reduction::Mean);
        if let Some(opt) = self.opt.as_mut() {
            opt.backward_step(&loss);
        }
        let loss = f32::try_from(loss.detach())?;
        trace!("fit step, loss = {}", loss);
        Ok(loss)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.var_store.save(path)?;
        info!("Save Q-network to {:?}", path);
        for (name, _) in self.var_store.variables().iter() {
            trace!("Save variable {}", name);
        }
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.var_store.load(path)?;
        info!("Load Q-network from {:?}", path);
        Ok(())
    }

    fn param_stats(&self) -> Record {
        param_stats(&self.var_store)
    }
}
