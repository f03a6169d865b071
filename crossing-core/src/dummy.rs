//! A value function without a neural network, used for tests.
use crate::{InputBatch, QBatch, ValueFunction, N_ACTIONS};
use anyhow::{bail, Result};
use std::{fs, path::Path, sync::Arc};

/// Value function computing action values with a fixed function of the local
/// features plus a trainable per-action offset.
///
/// Each fit step moves the offset by the mean residual of the batch.
#[derive(Clone)]
pub struct DummyValueFunction {
    values: Arc<dyn Fn(&[f32]) -> [f32; N_ACTIONS] + Send + Sync>,
    offset: [f32; N_ACTIONS],
    n_fits: usize,
    last_fit: Option<(InputBatch, QBatch)>,
    failing: bool,
}

impl DummyValueFunction {
    /// Values computed by `f` from the local features of a row.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[f32]) -> [f32; N_ACTIONS] + Send + Sync + 'static,
    {
        Self {
            values: Arc::new(f),
            offset: [0.0; N_ACTIONS],
            n_fits: 0,
            last_fit: None,
            failing: false,
        }
    }

    /// The same values for every row.
    pub fn constant(values: [f32; N_ACTIONS]) -> Self {
        Self::from_fn(move |_| values)
    }

    /// A value function whose methods always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::constant([0.0; N_ACTIONS])
        }
    }

    /// The number of fit steps so far.
    pub fn n_fits(&self) -> usize {
        self.n_fits
    }

    /// Inputs and targets of the last fit step.
    pub fn last_fit(&self) -> Option<&(InputBatch, QBatch)> {
        self.last_fit.as_ref()
    }

    /// Trainable offset.
    pub fn offset(&self) -> [f32; N_ACTIONS] {
        self.offset
    }
}

impl ValueFunction for DummyValueFunction {
    fn predict(&self, input: &InputBatch) -> Result<QBatch> {
        if self.failing {
            bail!("Prediction failed");
        }
        let mut q = QBatch::new(N_ACTIONS);
        for row in input.local.rows() {
            let mut v = (self.values)(row);
            for (v, o) in v.iter_mut().zip(self.offset.iter()) {
                *v += o;
            }
            q.push_row(&v);
        }
        Ok(q)
    }

    fn fit_step(&mut self, input: &InputBatch, target: &QBatch) -> Result<f32> {
        let pred = self.predict(input)?;
        let n = pred.len() as f32;
        let mut loss = 0.0;
        let mut residual = [0.0; N_ACTIONS];
        for (p, t) in pred.rows().zip(target.rows()) {
            for j in 0..N_ACTIONS {
                let d = t[j] - p[j];
                loss += d * d;
                residual[j] += d / n;
            }
        }
        for j in 0..N_ACTIONS {
            self.offset[j] += residual[j];
        }
        self.n_fits += 1;
        self.last_fit = Some((input.clone(), target.clone()));
        Ok(loss / (n * N_ACTIONS as f32))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_yaml::to_string(&self.offset.to_vec())?)?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let offset: Vec<f32> = serde_yaml::from_str(&fs::read_to_string(path)?)?;
        if offset.len() != N_ACTIONS {
            bail!("Expected {} values, got {}", N_ACTIONS, offset.len());
        }
        self.offset.copy_from_slice(&offset);
        Ok(())
    }
}
