use std::collections::HashMap;
use std::path::PathBuf;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tensorboard::TensorboardWriter;

/// Captures per-layer outputs during forward passes.
///
/// Layer names are fixed at construction as `fc_layer_{index}` in declaration
/// order, and observation is keyed by index, so no per-layer callbacks hold
/// references into the network. Until [`register_hooks`] is called nothing is
/// observed and the cache stays empty. Each forward pass overwrites the
/// previous entries; the cache is never cleared automatically.
///
/// [`register_hooks`]: ActivationRecorder::register_hooks
#[derive(Serialize, Deserialize)]
pub struct ActivationRecorder {
    layer_names: Vec<String>,
    activations: HashMap<String, Array2<f32>>,
    log_dir: PathBuf,
    step: i64,
    #[serde(skip)]
    hooked: bool,
    #[serde(skip)]
    writer: Option<TensorboardWriter>,
}

impl ActivationRecorder {
    pub fn new(num_layers: usize, log_dir: impl Into<PathBuf>) -> Self {
        let layer_names = (0..num_layers)
            .map(|i| format!("fc_layer_{}", i))
            .collect();
        ActivationRecorder {
            layer_names,
            activations: HashMap::new(),
            log_dir: log_dir.into(),
            step: 0,
            hooked: false,
            writer: None,
        }
    }

    /// Start observing layer outputs. Idempotent; the visualization sink is
    /// opened on the first call.
    pub fn register_hooks(&mut self) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(TensorboardWriter::new(&self.log_dir)?);
        }
        self.hooked = true;
        Ok(())
    }

    pub fn hooked(&self) -> bool {
        self.hooked
    }

    /// Advance the visualization step counter. Called once per forward pass;
    /// this counter is independent of any experiment-log iteration counter.
    pub(crate) fn begin_pass(&mut self) {
        if self.hooked {
            self.step += 1;
        }
    }

    /// Record one layer's output. A no-op until hooks are registered. The
    /// sink write is best-effort: a failed write is dropped and never reaches
    /// the forward-pass caller.
    pub(crate) fn observe(&mut self, index: usize, output: &Array2<f32>) {
        if !self.hooked {
            return;
        }
        let name = &self.layer_names[index];
        self.activations.insert(name.clone(), output.clone());
        if let Some(writer) = self.writer.as_mut() {
            let flat = Array1::from_iter(output.iter().copied());
            let _ = writer.add_histogram(&format!("Activations/{}", name), &flat, self.step);
        }
    }

    /// The most recent output captured for each layer, keyed by layer name.
    pub fn activations(&self) -> &HashMap<String, Array2<f32>> {
        &self.activations
    }

    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    /// Release the visualization sink. Safe to call repeatedly, including
    /// when nothing was ever written; captured activations stay available.
    pub fn close_writer(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
