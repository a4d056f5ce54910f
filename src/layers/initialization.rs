use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::{Normal, Uniform};
use ndarray_rand::RandomExt;

use crate::activations::Nonlinearity;

/// Weight initialization strategies
#[derive(Debug, Clone)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// Normal distribution with custom mean and std
    Normal { mean: f32, std: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize weights for a layer
    pub fn initialize_weights(&self, shape: (usize, usize)) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random(shape, Uniform::new(-limit, limit))
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in as f32).sqrt();
                Array2::random(shape, Uniform::new(-limit, limit))
            }

            WeightInit::Uniform { min, max } => {
                Array2::random(shape, Uniform::new(*min, *max))
            }

            WeightInit::Normal { mean, std } => {
                Array2::random(shape, Normal::new(*mean, *std).unwrap())
            }

            WeightInit::Zeros => {
                Array2::zeros(shape)
            }
        }
    }

    /// Initialize biases for a layer
    pub fn initialize_biases(&self, size: usize) -> Array1<f32> {
        match self {
            WeightInit::Zeros | WeightInit::XavierUniform | WeightInit::HeUniform => {
                Array1::zeros(size)
            }

            WeightInit::Uniform { min, max } => {
                Array1::random(size, Uniform::new(*min, *max))
            }

            WeightInit::Normal { mean, std } => {
                Array1::random(size, Normal::new(*mean, *std).unwrap())
            }
        }
    }

    /// Get the recommended initialization for a nonlinearity
    pub fn for_nonlinearity(nonlinearity: Nonlinearity) -> Self {
        match nonlinearity {
            Nonlinearity::Tanh => WeightInit::XavierUniform,
            Nonlinearity::Relu => WeightInit::HeUniform,
        }
    }
}
