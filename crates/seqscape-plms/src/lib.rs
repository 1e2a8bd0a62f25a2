//! seqscape-plms
//!
//! Pretrained protein language models for sequence embedding. Checkpoints
//! are fetched from HuggingFace and run locally with candle.
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{DType, Device, Result};

pub use protbert::{ProtBertModels, ProtBertRunner};

pub mod protbert;

pub const DTYPE: DType = DType::F32;

/// Picks the inference device: CUDA, then Metal, then CPU.
pub fn device(cpu: bool) -> Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else if cuda_is_available() {
        Ok(Device::new_cuda(0)?)
    } else if metal_is_available() {
        Ok(Device::new_metal(0)?)
    } else {
        log::info!("running on CPU; build with `--features cuda` or `--features metal` for GPU");
        Ok(Device::Cpu)
    }
}
