use std::path::PathBuf;

use crate::activations::Nonlinearity;
use crate::error::Result;
use crate::layers::WeightInit;
use crate::network::{BatchNormMlp, NormalizedMlp};

/// Builder for [`NormalizedMlp`] with a fluent API.
///
/// Defaults mirror the common policy-network setup: two hidden layers of 64
/// units, tanh nonlinearity, identity boundary transforms.
pub struct NormalizedMlpBuilder {
    obs_dim: usize,
    act_dim: usize,
    hidden_sizes: Vec<usize>,
    nonlinearity: Nonlinearity,
    in_shift: Option<Vec<f32>>,
    in_scale: Option<Vec<f32>>,
    out_shift: Option<Vec<f32>>,
    out_scale: Option<Vec<f32>>,
    weight_init: Option<WeightInit>,
    log_dir: PathBuf,
}

impl NormalizedMlpBuilder {
    pub fn new(obs_dim: usize, act_dim: usize) -> Self {
        NormalizedMlpBuilder {
            obs_dim,
            act_dim,
            hidden_sizes: vec![64, 64],
            nonlinearity: Nonlinearity::Tanh,
            in_shift: None,
            in_scale: None,
            out_shift: None,
            out_scale: None,
            weight_init: None,
            log_dir: PathBuf::from("runs/activations"),
        }
    }

    pub fn hidden_sizes(mut self, hidden_sizes: &[usize]) -> Self {
        self.hidden_sizes = hidden_sizes.to_vec();
        self
    }

    pub fn nonlinearity(mut self, nonlinearity: Nonlinearity) -> Self {
        self.nonlinearity = nonlinearity;
        self
    }

    /// Boundary transform vectors; `None` leaves that vector at identity.
    pub fn transformations(
        mut self,
        in_shift: Option<&[f32]>,
        in_scale: Option<&[f32]>,
        out_shift: Option<&[f32]>,
        out_scale: Option<&[f32]>,
    ) -> Self {
        self.in_shift = in_shift.map(<[f32]>::to_vec);
        self.in_scale = in_scale.map(<[f32]>::to_vec);
        self.out_shift = out_shift.map(<[f32]>::to_vec);
        self.out_scale = out_scale.map(<[f32]>::to_vec);
        self
    }

    pub fn weight_init(mut self, weight_init: WeightInit) -> Self {
        self.weight_init = Some(weight_init);
        self
    }

    pub fn log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn build(self) -> Result<NormalizedMlp> {
        let mut network = NormalizedMlp::new(
            self.obs_dim,
            self.act_dim,
            &self.hidden_sizes,
            self.nonlinearity,
            self.log_dir,
        )?;
        network.set_transformations(
            self.in_shift.as_deref(),
            self.in_scale.as_deref(),
            self.out_shift.as_deref(),
            self.out_scale.as_deref(),
        )?;
        if let Some(init) = self.weight_init {
            for layer in &mut network.fc_layers {
                let shape = (layer.input_size(), layer.output_size());
                layer.weights = init.initialize_weights(shape);
                layer.biases = init.initialize_biases(shape.1);
            }
        }
        Ok(network)
    }
}

/// Builder for [`BatchNormMlp`] with a fluent API.
///
/// Defaults differ from [`NormalizedMlpBuilder`] on purpose: relu
/// nonlinearity and no dropout.
pub struct BatchNormMlpBuilder {
    obs_dim: usize,
    act_dim: usize,
    hidden_sizes: Vec<usize>,
    nonlinearity: Nonlinearity,
    dropout: f32,
    weight_init: Option<WeightInit>,
    log_dir: PathBuf,
}

impl BatchNormMlpBuilder {
    pub fn new(obs_dim: usize, act_dim: usize) -> Self {
        BatchNormMlpBuilder {
            obs_dim,
            act_dim,
            hidden_sizes: vec![64, 64],
            nonlinearity: Nonlinearity::Relu,
            dropout: 0.0,
            weight_init: None,
            log_dir: PathBuf::from("runs/activations_with_batchnorm"),
        }
    }

    pub fn hidden_sizes(mut self, hidden_sizes: &[usize]) -> Self {
        self.hidden_sizes = hidden_sizes.to_vec();
        self
    }

    pub fn nonlinearity(mut self, nonlinearity: Nonlinearity) -> Self {
        self.nonlinearity = nonlinearity;
        self
    }

    /// Drop probability in `[0, 1)`; 0 disables dropout.
    pub fn dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn weight_init(mut self, weight_init: WeightInit) -> Self {
        self.weight_init = Some(weight_init);
        self
    }

    pub fn log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn build(self) -> Result<BatchNormMlp> {
        let mut network = BatchNormMlp::new(
            self.obs_dim,
            self.act_dim,
            &self.hidden_sizes,
            self.nonlinearity,
            self.dropout,
            self.log_dir,
        )?;
        if let Some(init) = self.weight_init {
            for layer in &mut network.fc_layers {
                let shape = (layer.input_size(), layer.output_size());
                layer.weights = init.initialize_weights(shape);
                layer.biases = init.initialize_biases(shape.1);
            }
        }
        Ok(network)
    }
}
