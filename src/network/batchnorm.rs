use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use bincode::{deserialize, serialize};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::activations::Nonlinearity;
use crate::device::Device;
use crate::error::{MetisError, Result};
use crate::layers::{BatchNormLayer, Dropout, LinearLayer};
use crate::network::recorder::ActivationRecorder;

/// Batch-norm momentum and epsilon for the input normalization layer.
const BN_MOMENTUM: f32 = 0.1;
const BN_EPSILON: f32 = 1e-5;

/// A stack of fully-connected layers with running-statistics input
/// normalization and per-layer dropout in place of static boundary
/// transforms.
///
/// The input passes through batch normalization, each hidden layer applies
/// affine, then dropout, then the nonlinearity (dropout precedes the
/// nonlinearity on this variant), and the final layer is affine only. There
/// is no output denormalization.
///
/// Owned state (layer parameters, batch-norm gamma/beta and running
/// statistics) forms one bundle tagged with a single [`Device`].
#[derive(Serialize, Deserialize)]
pub struct BatchNormMlp {
    pub obs_dim: usize,
    pub act_dim: usize,
    pub layer_sizes: Vec<usize>,
    pub fc_layers: Vec<LinearLayer>,
    nonlinearity: Nonlinearity,
    pub input_batchnorm: BatchNormLayer,
    dropout: Dropout,
    device: Device,
    recorder: ActivationRecorder,
}

impl BatchNormMlp {
    /// Create a network whose input normalization is learned from batch
    /// statistics. `dropout` is the drop probability in `[0, 1)`; 0 disables
    /// dropout entirely.
    pub fn new(
        obs_dim: usize,
        act_dim: usize,
        hidden_sizes: &[usize],
        nonlinearity: Nonlinearity,
        dropout: f32,
        log_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        if obs_dim == 0 {
            return Err(MetisError::invalid_parameter("obs_dim", "must be positive"));
        }
        if act_dim == 0 {
            return Err(MetisError::invalid_parameter("act_dim", "must be positive"));
        }
        if hidden_sizes.iter().any(|&h| h == 0) {
            return Err(MetisError::invalid_parameter(
                "hidden_sizes",
                "every hidden width must be positive",
            ));
        }

        let mut layer_sizes = Vec::with_capacity(hidden_sizes.len() + 2);
        layer_sizes.push(obs_dim);
        layer_sizes.extend_from_slice(hidden_sizes);
        layer_sizes.push(act_dim);

        let fc_layers = layer_sizes
            .windows(2)
            .map(|window| LinearLayer::new(window[0], window[1]))
            .collect::<Vec<_>>();
        let num_layers = fc_layers.len();

        Ok(BatchNormMlp {
            obs_dim,
            act_dim,
            layer_sizes,
            fc_layers,
            nonlinearity,
            input_batchnorm: BatchNormLayer::new(obs_dim, BN_MOMENTUM, BN_EPSILON),
            dropout: Dropout::new(dropout)?,
            device: Device::default(),
            recorder: ActivationRecorder::new(num_layers, log_dir),
        })
    }

    /// Batch normalization subsumes input normalization on this variant and
    /// there is no output denormalization, so this is deliberately a no-op.
    pub fn set_transformations(
        &mut self,
        _in_shift: Option<&[f32]>,
        _in_scale: Option<&[f32]>,
        _out_shift: Option<&[f32]>,
        _out_scale: Option<&[f32]>,
    ) -> Result<()> {
        Ok(())
    }

    /// Toggle training mode: batch-norm statistics updates and dropout
    /// stochasticity switch together. Eval mode is deterministic.
    pub fn set_training(&mut self, training: bool) {
        self.input_batchnorm.set_training(training);
        self.dropout.set_training(training);
    }

    /// Forward pass for a single observation vector.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let input = input.insert_axis(Axis(0));
        let output = self.forward_batch(input.view());
        let shape = output.shape()[1];
        output.into_shape((shape,)).expect("Failed to reshape output")
    }

    /// Forward pass for a batch of observation vectors, `[N, obs_dim]` to
    /// `[N, act_dim]`.
    pub fn forward_batch(&mut self, x: ArrayView2<f32>) -> Array2<f32> {
        let out = self.device.adopt(x);
        let mut out = self.input_batchnorm.forward_batch(out.view());

        self.recorder.begin_pass();
        let last = self.fc_layers.len() - 1;
        for i in 0..last {
            out = self.fc_layers[i].forward_batch(out.view());
            self.recorder.observe(i, &out);
            out = self.dropout.forward_batch(out.view());
            self.nonlinearity.apply_batch(&mut out);
        }
        out = self.fc_layers[last].forward_batch(out.view());
        self.recorder.observe(last, &out);
        out
    }

    /// Move the network's entire state bundle, running statistics included,
    /// to `device`.
    pub fn to(&mut self, device: Device) {
        self.device = device;
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn nonlinearity(&self) -> Nonlinearity {
        self.nonlinearity
    }

    pub fn dropout_rate(&self) -> f32 {
        self.dropout.rate
    }

    /// Enumerate trainable affine parameters as (weights, biases) pairs for
    /// an external optimizer. Batch-norm gamma/beta are exposed through
    /// [`input_batchnorm`](Self::input_batchnorm).
    pub fn parameters(&self) -> impl Iterator<Item = (&Array2<f32>, &Array1<f32>)> {
        self.fc_layers.iter().map(|layer| (&layer.weights, &layer.biases))
    }

    pub fn parameters_mut(&mut self) -> impl Iterator<Item = (&mut Array2<f32>, &mut Array1<f32>)> {
        self.fc_layers
            .iter_mut()
            .map(|layer| (&mut layer.weights, &mut layer.biases))
    }

    /// Start mirroring layer outputs into the activation cache and the
    /// visualization sink. Idempotent.
    pub fn register_hooks(&mut self) -> Result<()> {
        self.recorder.register_hooks()
    }

    /// The most recent captured output per layer, keyed `fc_layer_{index}`.
    pub fn activations(&self) -> &HashMap<String, Array2<f32>> {
        self.recorder.activations()
    }

    /// Release the visualization sink. Safe to call multiple times.
    pub fn close_writer(&mut self) {
        self.recorder.close_writer()
    }

    /// Save the network's state, running statistics included, to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let serialized = serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load a network from a file. Hooks are detached on the loaded instance;
    /// call [`register_hooks`](Self::register_hooks) again to re-attach.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let deserialized: Self = deserialize(&buffer)?;
        Ok(deserialized)
    }
}
