use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Batch normalization over the feature axis of a batch.
///
/// Normalizes inputs to mean 0 and variance 1, then scales and shifts with
/// the learnable parameters gamma and beta. Training-mode forwards update
/// running mean/variance estimates by exponential moving average; eval-mode
/// forwards use the running estimates and leave them untouched.
#[derive(Serialize, Deserialize, Clone)]
pub struct BatchNormLayer {
    /// Scale parameter (gamma)
    pub gamma: Array1<f32>,

    /// Shift parameter (beta)
    pub beta: Array1<f32>,

    /// Running mean for inference
    pub running_mean: Array1<f32>,

    /// Running variance for inference
    pub running_var: Array1<f32>,

    /// Momentum for running statistics
    pub momentum: f32,

    /// Small constant for numerical stability
    pub epsilon: f32,

    /// Whether we're in training mode
    pub training: bool,
}

impl BatchNormLayer {
    pub fn new(num_features: usize, momentum: f32, epsilon: f32) -> Self {
        BatchNormLayer {
            gamma: Array1::ones(num_features),
            beta: Array1::zeros(num_features),
            running_mean: Array1::zeros(num_features),
            running_var: Array1::ones(num_features),
            momentum,
            epsilon,
            training: true,
        }
    }

    /// Set training mode
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    /// Forward pass. Batch statistics require more than one sample; smaller
    /// batches always normalize with the running estimates.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let batch_size = inputs.shape()[0];

        if self.training && batch_size > 1 {
            let mean = inputs.mean_axis(Axis(0)).unwrap();
            let var = inputs.var_axis(Axis(0), 0.0);
            let std = var.mapv(|v| (v + self.epsilon).sqrt());

            let normalized = (&inputs - &mean.view().insert_axis(Axis(0)))
                / &std.view().insert_axis(Axis(0));

            self.running_mean = &self.running_mean * (1.0 - self.momentum) + &mean * self.momentum;
            self.running_var = &self.running_var * (1.0 - self.momentum) + &var * self.momentum;

            &normalized * &self.gamma.view().insert_axis(Axis(0))
                + &self.beta.view().insert_axis(Axis(0))
        } else {
            let std = self.running_var.mapv(|v| (v + self.epsilon).sqrt());
            let normalized = (&inputs - &self.running_mean.view().insert_axis(Axis(0)))
                / &std.view().insert_axis(Axis(0));

            &normalized * &self.gamma.view().insert_axis(Axis(0))
                + &self.beta.view().insert_axis(Axis(0))
        }
    }

    pub fn num_features(&self) -> usize {
        self.gamma.len()
    }
}
