//! Compute-device placement for network state.
//!
//! A network's device-resident state (trainable parameters, boundary
//! transform buffers, batch-norm running statistics) forms one logical bundle
//! tagged with a single [`Device`]. Migration retags the bundle as a whole,
//! so a partially-moved network is unrepresentable and the transform buffers
//! can never lag behind the parameters.

use std::fmt;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Identifies where a network's state bundle is resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Device {
    #[default]
    Cpu,
    /// Accelerator placement. Tensor storage in this crate is host-backed,
    /// so the tag records placement identity rather than a distinct memory
    /// space.
    Gpu,
}

impl Device {
    /// Bring a caller-supplied batch onto this device before it touches the
    /// network's owned state. Inputs may arrive from anywhere; the adopted
    /// copy is guaranteed to share the bundle's placement, so the boundary
    /// transform never mixes placements.
    pub fn adopt(&self, x: ArrayView2<f32>) -> Array2<f32> {
        x.to_owned()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Gpu => write!(f, "gpu"),
        }
    }
}
