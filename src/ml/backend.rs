// ============================================================
// Layer 5 - Backend Selection
// ============================================================
// Every model is generic over `burn::tensor::backend::Backend`;
// the binary picks one here. NdArray on the CPU by default,
// Wgpu with `--features wgpu`.

use burn::tensor::backend::Backend;

#[cfg(feature = "wgpu")]
pub type ComputeBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type ComputeBackend = burn::backend::NdArray;

/// Backend with gradient tracking, used by the training loops
pub type TrainingBackend = burn::backend::Autodiff<ComputeBackend>;

pub type Device = <ComputeBackend as Backend>::Device;

pub fn default_device() -> Device {
    Device::default()
}
