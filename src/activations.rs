//! Nonlinearities available to the network stacks.
//!
//! The set is closed on purpose: a network resolves its nonlinearity once at
//! construction, and an unsupported choice is unrepresentable rather than a
//! silently-applied default.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// The nonlinearities supported between fully-connected layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Nonlinearity {
    #[default]
    Tanh,
    Relu,
}

impl Nonlinearity {
    /// Apply the nonlinearity to a single vector in-place.
    pub fn apply(&self, input: &mut Array1<f32>) {
        match self {
            Nonlinearity::Tanh => {
                input.mapv_inplace(|v| v.tanh());
            }
            Nonlinearity::Relu => {
                input.mapv_inplace(|v| v.max(0.0));
            }
        }
    }

    /// Apply the nonlinearity to a batch in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        match self {
            Nonlinearity::Tanh => {
                inputs.mapv_inplace(|v| v.tanh());
            }
            Nonlinearity::Relu => {
                inputs.mapv_inplace(|v| v.max(0.0));
            }
        }
    }

    /// Compute the derivative of the nonlinearity for a batch of
    /// pre-activation values. Used by external gradient machinery.
    pub fn derivative_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Nonlinearity::Tanh => {
                inputs.mapv(|v| {
                    let tanh_v = v.tanh();
                    1.0 - tanh_v * tanh_v
                })
            }
            Nonlinearity::Relu => {
                inputs.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
            }
        }
    }
}
