use serde::{Deserialize, Serialize};
use tch::Device;

/// Device on which the networks are placed.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum DeviceConfig {
    /// CPU.
    Cpu,

    /// The CUDA device of the given index.
    Cuda(usize),

    /// The first CUDA device if any, otherwise CPU.
    CudaIfAvailable,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::Cpu
    }
}

impl From<DeviceConfig> for Device {
    fn from(config: DeviceConfig) -> Self {
        match config {
            DeviceConfig::Cpu => Device::Cpu,
            DeviceConfig::Cuda(ix) => Device::Cuda(ix),
            DeviceConfig::CudaIfAvailable => Device::cuda_if_available(),
        }
    }
}
