use ndarray::{Array2, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MetisError, Result};

/// Inverted dropout.
///
/// Randomly zeroes units with probability `p` during training and rescales
/// the survivors by `1 / (1 - p)`; an identity map in eval mode. A rate of 0
/// disables dropout entirely. Owns no state beyond the rate and mode flag.
#[derive(Serialize, Deserialize, Clone)]
pub struct Dropout {
    /// Probability of dropping a unit
    pub rate: f32,

    /// Whether we're in training mode
    training: bool,
}

impl Dropout {
    pub fn new(rate: f32) -> Result<Self> {
        if !(0.0..1.0).contains(&rate) {
            return Err(MetisError::invalid_parameter(
                "dropout",
                "rate must be in [0, 1)",
            ));
        }
        Ok(Dropout {
            rate,
            training: true,
        })
    }

    /// Set training mode
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        if !self.training || self.rate == 0.0 {
            return inputs.to_owned();
        }

        let mut rng = rand::thread_rng();
        let scale = 1.0 / (1.0 - self.rate);

        let mut mask = Array2::zeros(inputs.dim());
        for v in mask.iter_mut() {
            if rng.gen::<f32>() > self.rate {
                *v = scale;
            }
        }

        inputs.to_owned() * &mask
    }
}
