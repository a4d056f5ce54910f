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
use crate::layers::LinearLayer;
use crate::network::recorder::ActivationRecorder;

/// Epsilon added to the input scale so an all-zero scale cannot divide by zero.
const SCALE_EPS: f32 = 1e-8;

/// Static affine normalization applied at a network's boundaries.
///
/// The vectors are fixed buffers, not trainable parameters: gradient descent
/// never touches them, and they are only replaced wholesale through
/// [`NormalizedMlp::set_transformations`].
#[derive(Serialize, Deserialize, Clone)]
pub struct BoundaryTransform {
    pub in_shift: Array1<f32>,
    pub in_scale: Array1<f32>,
    pub out_shift: Array1<f32>,
    pub out_scale: Array1<f32>,
}

impl BoundaryTransform {
    /// The identity transform: zero shifts, unit scales.
    pub fn identity(obs_dim: usize, act_dim: usize) -> Self {
        BoundaryTransform {
            in_shift: Array1::zeros(obs_dim),
            in_scale: Array1::ones(obs_dim),
            out_shift: Array1::zeros(act_dim),
            out_scale: Array1::ones(act_dim),
        }
    }
}

/// A stack of fully-connected layers bracketed by static affine input/output
/// normalization, so callers never pre-normalize raw observation or action
/// scales.
///
/// The input is shifted then scaled, hidden layers apply affine + the
/// configured nonlinearity, the final layer is affine only, and the output is
/// scaled then shifted back to raw action space.
///
/// All owned tensors (layer parameters and the four boundary buffers) live in
/// one state bundle tagged with a single [`Device`]; [`NormalizedMlp::to`]
/// migrates the bundle atomically. Instances are single-owner: concurrent
/// forwards, or a migration concurrent with a forward, require external
/// synchronization.
#[derive(Serialize, Deserialize)]
pub struct NormalizedMlp {
    pub obs_dim: usize,
    pub act_dim: usize,
    pub layer_sizes: Vec<usize>,
    pub fc_layers: Vec<LinearLayer>,
    nonlinearity: Nonlinearity,
    transform: BoundaryTransform,
    device: Device,
    recorder: ActivationRecorder,
}

impl NormalizedMlp {
    /// Create a network with identity boundary transforms.
    ///
    /// The layer topology is `(obs_dim,) + hidden_sizes + (act_dim,)`; every
    /// consecutive pair becomes one affine layer. `log_dir` names the run
    /// directory the activation sink writes to once hooks are registered.
    pub fn new(
        obs_dim: usize,
        act_dim: usize,
        hidden_sizes: &[usize],
        nonlinearity: Nonlinearity,
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

        Ok(NormalizedMlp {
            obs_dim,
            act_dim,
            layer_sizes,
            fc_layers,
            nonlinearity,
            transform: BoundaryTransform::identity(obs_dim, act_dim),
            device: Device::default(),
            recorder: ActivationRecorder::new(num_layers, log_dir),
        })
    }

    /// Replace the boundary buffers. `None` means identity for that vector
    /// (zero shift, unit scale); supplied slices must match the boundary
    /// widths exactly. Buffers always share the bundle's device.
    pub fn set_transformations(
        &mut self,
        in_shift: Option<&[f32]>,
        in_scale: Option<&[f32]>,
        out_shift: Option<&[f32]>,
        out_scale: Option<&[f32]>,
    ) -> Result<()> {
        let check = |name: &str, v: Option<&[f32]>, dim: usize| -> Result<()> {
            match v {
                Some(values) if values.len() != dim => Err(MetisError::dimension_mismatch(
                    format!("{} of length {}", name, dim),
                    format!("length {}", values.len()),
                )),
                _ => Ok(()),
            }
        };
        check("in_shift", in_shift, self.obs_dim)?;
        check("in_scale", in_scale, self.obs_dim)?;
        check("out_shift", out_shift, self.act_dim)?;
        check("out_scale", out_scale, self.act_dim)?;

        let or_default = |v: Option<&[f32]>, default: &Array1<f32>| match v {
            Some(values) => Array1::from(values.to_vec()),
            None => default.clone(),
        };
        self.transform = BoundaryTransform {
            in_shift: or_default(in_shift, &Array1::zeros(self.obs_dim)),
            in_scale: or_default(in_scale, &Array1::ones(self.obs_dim)),
            out_shift: or_default(out_shift, &Array1::zeros(self.act_dim)),
            out_scale: or_default(out_scale, &Array1::ones(self.act_dim)),
        };
        Ok(())
    }

    pub fn transformations(&self) -> &BoundaryTransform {
        &self.transform
    }

    /// Forward pass for a single observation vector.
    pub fn forward(&mut self, input: ArrayView1<f32>) -> Array1<f32> {
        let input = input.insert_axis(Axis(0));
        let output = self.forward_batch(input.view());
        let shape = output.shape()[1];
        output.into_shape((shape,)).expect("Failed to reshape output")
    }

    /// Forward pass for a batch of observation vectors, `[N, obs_dim]` to
    /// `[N, act_dim]`. Pure function of the input and current state.
    pub fn forward_batch(&mut self, x: ArrayView2<f32>) -> Array2<f32> {
        let out = self.device.adopt(x);
        let mut out = (&out - &self.transform.in_shift.view().insert_axis(Axis(0)))
            / &(&self.transform.in_scale + SCALE_EPS).insert_axis(Axis(0));

        self.recorder.begin_pass();
        let last = self.fc_layers.len() - 1;
        for i in 0..last {
            out = self.fc_layers[i].forward_batch(out.view());
            self.recorder.observe(i, &out);
            self.nonlinearity.apply_batch(&mut out);
        }
        out = self.fc_layers[last].forward_batch(out.view());
        self.recorder.observe(last, &out);

        &out * &self.transform.out_scale.view().insert_axis(Axis(0))
            + &self.transform.out_shift.view().insert_axis(Axis(0))
    }

    /// Move the network's entire state bundle to `device`.
    ///
    /// Layer parameters and boundary buffers share one bundle, so after this
    /// call every owned tensor reports the new device and the next forward
    /// needs no cross-device copy in the transform step.
    pub fn to(&mut self, device: Device) {
        self.device = device;
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn nonlinearity(&self) -> Nonlinearity {
        self.nonlinearity
    }

    /// Enumerate trainable parameters as (weights, biases) pairs, in layer
    /// order, for an external optimizer.
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

    /// Save the network's state to a file.
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
