//! Utilities.
use crate::QInput;
use anyhow::{bail, Result};
use crossing_core::{
    record::{Record, RecordValue},
    InputBatch, RowBatch,
};
use log::trace;
use tch::{nn::VarStore, Device, Kind, Tensor};

/// Returns the mean and standard deviation of the parameters.
pub fn param_stats(var_store: &VarStore) -> Record {
    let mut record = Record::empty();

    for (k, v) in var_store.variables() {
        if let Ok(m) = f32::try_from(v.mean(Kind::Float)) {
            record.insert(format!("{}_mean", &k), RecordValue::Scalar(m));
        }
        if let Ok(s) = f32::try_from(v.std(false)) {
            record.insert(format!("{}_std", &k), RecordValue::Scalar(s));
        }
    }

    record
}

/// Copies the values of the variables of `src` into `dest`.
///
/// Variables are identified by their names.
pub fn copy_vars(dest: &VarStore, src: &VarStore) {
    let src = src.variables();
    let dest = dest.variables();
    debug_assert_eq!(src.len(), dest.len());

    tch::no_grad(|| {
        for (name, mut dest) in dest {
            if let Some(src) = src.get(&name) {
                dest.copy_(src);
            }
        }
    });
    trace!("copy variables");
}

/// Converts a [`RowBatch`] to a `[rows, dim]` tensor on `device`.
pub fn batch_to_tensor(batch: &RowBatch, device: Device) -> Tensor {
    Tensor::from_slice(batch.as_slice())
        .view([batch.len() as i64, batch.dim() as i64])
        .to(device)
}

/// Converts an [`InputBatch`] to the input of a Q-network.
pub fn input_to_tensors(input: &InputBatch, device: Device) -> QInput {
    QInput {
        joint: input.joint.as_ref().map(|b| batch_to_tensor(b, device)),
        local: batch_to_tensor(&input.local, device),
    }
}

/// Converts a `[rows, dim]` tensor to a [`RowBatch`].
pub fn tensor_to_batch(t: &Tensor) -> Result<RowBatch> {
    let size = t.size();
    if size.len() != 2 || size[1] <= 0 {
        bail!("Expected a tensor of shape [rows, dim], got {:?}", size);
    }
    let t = t.to_kind(Kind::Float).to(Device::Cpu).flatten(0, -1);
    let data = Vec::<f32>::try_from(&t)?;
    Ok(RowBatch::from_vec(data, size[1] as usize))
}
