//! CSV-backed visualization sink for activation distributions.
//!
//! Writes per-layer distribution summaries in a format that downstream
//! plotting tooling can consume directly. Writes are flushed eagerly so a
//! crashed run still leaves a readable log behind.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::Array1;

/// Histogram writer for a single run directory.
pub struct TensorboardWriter {
    log_dir: PathBuf,
    start_time: u64,
    histogram_writer: BufWriter<File>,
}

impl TensorboardWriter {
    /// Create a writer rooted at `log_dir`, creating the directory if needed.
    pub fn new(log_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let log_dir = log_dir.as_ref().to_path_buf();
        create_dir_all(&log_dir)?;

        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let histogram_file = File::create(log_dir.join("histograms.csv"))?;
        let mut histogram_writer = BufWriter::new(histogram_file);
        writeln!(histogram_writer, "step,tag,count,min,max,mean,std,wall_time")?;

        Ok(Self {
            log_dir,
            start_time,
            histogram_writer,
        })
    }

    /// Log a distribution summary of `values` under `tag` at `step`.
    pub fn add_histogram(&mut self, tag: &str, values: &Array1<f32>, step: i64) -> std::io::Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let count = values.len();
        let min = values.iter().fold(f32::INFINITY, |a, &b| a.min(b));
        let max = values.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let mean = values.mean().unwrap_or(0.0);

        let variance = values.iter()
            .map(|&v| (v - mean).powi(2))
            .sum::<f32>() / count as f32;
        let std = variance.sqrt();

        let wall_time = self.get_wall_time();

        writeln!(self.histogram_writer, "{},{},{},{},{},{},{},{}",
                 step, tag, count, min, max, mean, std, wall_time)?;
        self.histogram_writer.flush()?;
        Ok(())
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Get current wall time in seconds since the writer was opened
    fn get_wall_time(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        now - self.start_time
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.histogram_writer.flush()
    }
}

impl Drop for TensorboardWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
