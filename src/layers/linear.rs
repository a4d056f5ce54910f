use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

/// A fully connected affine layer: `y = x W + b`.
///
/// The layer applies no nonlinearity of its own; the owning network decides
/// what follows the affine map. Inputs are cached on each forward pass so
/// `backward_batch` can hand parameter gradients to an external training loop.
#[derive(Serialize, Deserialize, Clone)]
pub struct LinearLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    inputs: Option<Array2<f32>>,
}

impl LinearLayer {
    /// Create a new layer with the given input and output widths.
    /// Weights start from a uniform distribution between -0.1 and 0.1,
    /// biases from zero.
    pub fn new(input_size: usize, output_size: usize) -> Self {
        let weights = Array2::random((input_size, output_size), Uniform::new(-0.1, 0.1));
        let biases = Array1::zeros(output_size);
        LinearLayer {
            weights,
            biases,
            inputs: None,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), (self.weights.dim().0, self.weights.dim().1));
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    /// Forward pass for a single input vector.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let input = input.insert_axis(Axis(0));
        let output = self.forward_batch(input.view());
        let shape = output.shape()[1];
        output.into_shape((shape,)).expect("Failed to reshape output")
    }

    /// Forward pass for a batch of input vectors.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.inputs = Some(inputs.to_owned());
        inputs.dot(&self.weights) + &self.biases.to_owned().insert_axis(Axis(0))
    }

    /// Compute gradients for a batch of output errors.
    /// Returns (input gradients, weight gradients, bias gradients).
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let inputs = self.inputs.as_ref()
            .expect("No inputs stored. forward_batch() must be called before backward_batch()");

        let weight_gradients = inputs.t().dot(&output_errors);
        let bias_gradients = output_errors.sum_axis(Axis(0));
        let input_gradients = output_errors.dot(&self.weights.t());

        (input_gradients, weight_gradients, bias_gradients)
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }
}
