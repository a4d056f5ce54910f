//! Experiment log: named scalar time series accumulated across training
//! iterations, persisted to CSV and binary snapshots, optionally mirrored to
//! an external dashboard.
//!
//! This component is a boundary collaborator of the networks; no data path
//! connects a forward pass to the log. Alignment of series across iterations
//! is the caller's responsibility: a key skipped in one iteration leaves its
//! series short, and neither [`ExperimentLog::get_current_log`] nor
//! [`ExperimentLog::save_log`] detects that.

use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MetisError, Result};

/// Receives scalar metrics mirrored to an external dashboard.
///
/// Implementations carry their own project/entity/run configuration; the log
/// itself holds no ambient defaults.
pub trait DashboardSink {
    fn log_scalar(&mut self, key: &str, value: f32, step: u64);
}

/// Append-only named scalar time series indexed implicitly by iteration.
#[derive(Default, Serialize, Deserialize)]
pub struct ExperimentLog {
    series: HashMap<String, Vec<f32>>,
    key_order: Vec<String>,
    /// High-water mark over all series lengths.
    pub max_len: usize,
    /// Monotonic step counter, advanced by the training loop and used to key
    /// dashboard writes.
    pub global_step: u64,
    #[serde(skip)]
    dashboard: Option<Box<dyn DashboardSink>>,
}

impl ExperimentLog {
    pub fn new() -> Self {
        ExperimentLog::default()
    }

    /// Create a log that mirrors every appended value to `sink`.
    pub fn with_dashboard(sink: Box<dyn DashboardSink>) -> Self {
        ExperimentLog {
            dashboard: Some(sink),
            ..ExperimentLog::default()
        }
    }

    /// Append `value` to the series named `key`, creating the series on first
    /// use. Forwards to the dashboard, if any, keyed by `global_step`.
    pub fn log_kv(&mut self, key: &str, value: f32) {
        if !self.series.contains_key(key) {
            self.key_order.push(key.to_string());
        }
        let series = self.series.entry(key.to_string()).or_default();
        series.push(value);
        if series.len() > self.max_len {
            self.max_len += 1;
        }
        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.log_scalar(key, value, self.global_step);
        }
    }

    /// Keys in first-logged order; this is also the CSV column order.
    pub fn keys(&self) -> &[String] {
        &self.key_order
    }

    pub fn series(&self, key: &str) -> Option<&[f32]> {
        self.series.get(key).map(Vec::as_slice)
    }

    /// The most recently appended value for each key. When some keys were
    /// skipped in an iteration these values come from different iterations;
    /// that misalignment is not detected here.
    pub fn get_current_log(&self) -> HashMap<String, f32> {
        self.series
            .iter()
            .filter_map(|(key, values)| values.last().map(|&v| (key.clone(), v)))
            .collect()
    }

    /// Push the latest row to the dashboard at the current `global_step`.
    pub fn sync_with_dashboard(&mut self) {
        let latest = self.get_current_log();
        if let Some(dashboard) = self.dashboard.as_mut() {
            for (key, value) in &latest {
                dashboard.log_scalar(key, *value, self.global_step);
            }
        }
    }

    /// Truncate every series to its first `num_entries` values.
    ///
    /// Panics if series lengths still differ afterwards, which happens
    /// exactly when they had already diverged before the call.
    pub fn shrink_to(&mut self, num_entries: usize) {
        for series in self.series.values_mut() {
            series.truncate(num_entries);
        }
        self.max_len = num_entries;

        let min = self.series.values().map(Vec::len).min().unwrap_or(0);
        let max = self.series.values().map(Vec::len).max().unwrap_or(0);
        assert_eq!(min, max, "series lengths diverged before shrink_to");
    }

    /// Persist the log under `save_dir` as `log.csv` (one row per iteration
    /// index, one column per key, missing values blank) and `log.bin` (an
    /// opaque binary snapshot).
    pub fn save_log(&self, save_dir: impl AsRef<Path>) -> Result<()> {
        let save_dir = save_dir.as_ref();
        create_dir_all(save_dir)?;

        let snapshot = bincode::serialize(self)?;
        let mut bin_file = File::create(save_dir.join("log.bin"))?;
        bin_file.write_all(&snapshot)?;

        let csv_file = File::create(save_dir.join("log.csv"))?;
        let mut writer = BufWriter::new(csv_file);

        let mut columns: Vec<&str> = Vec::with_capacity(self.key_order.len() + 1);
        if !self.key_order.iter().any(|k| k == "iteration") {
            columns.push("iteration");
        }
        columns.extend(self.key_order.iter().map(String::as_str));
        writeln!(writer, "{}", columns.join(","))?;

        for row in 0..self.max_len {
            let fields: Vec<String> = columns
                .iter()
                .map(|&column| match self.series.get(column) {
                    Some(values) if row < values.len() => values[row].to_string(),
                    // the iteration column falls back to the physical row index
                    _ if column == "iteration" => row.to_string(),
                    _ => String::new(),
                })
                .collect();
            writeln!(writer, "{}", fields.join(","))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Pretty-JSON export of all series, one array per key.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.series)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Restore series state from a binary snapshot written by
    /// [`save_log`](Self::save_log).
    pub fn read_snapshot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let restored: ExperimentLog = bincode::deserialize(&buffer)?;
        self.series = restored.series;
        self.key_order = restored.key_order;
        self.max_len = restored.max_len;
        self.global_step = restored.global_step;
        Ok(())
    }

    /// Restore series state from a `log.csv` written by
    /// [`save_log`](Self::save_log).
    ///
    /// An `iteration` column whose value disagrees with the physical row
    /// index is treated as corruption and fails hard, with nothing restored.
    /// Any other malformed scalar is skipped with a diagnostic on stderr
    /// while the rest of the row is read, which can leave series lengths
    /// misaligned.
    pub fn read_log(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(MetisError::CorruptLog {
                    row: 0,
                    detail: "missing header line".to_string(),
                })
            }
        };
        let keys: Vec<String> = header.split(',').map(str::to_string).collect();
        let iteration_idx = keys.iter().position(|k| k == "iteration");
        let mut columns: Vec<Vec<f32>> = vec![Vec::new(); keys.len()];

        for (row, line) in lines.enumerate() {
            let line = line?;
            for (idx, field) in line.split(',').enumerate().take(keys.len()) {
                match field.parse::<f32>() {
                    Ok(value) => columns[idx].push(value),
                    Err(_) => eprintln!("ERROR on reading key {}: {:?}", keys[idx], field),
                }
            }
            if let Some(idx) = iteration_idx {
                if let Some(&iteration) = columns[idx].last() {
                    if iteration as usize != row {
                        return Err(MetisError::CorruptLog {
                            row,
                            detail: format!("iteration column reads {}", iteration),
                        });
                    }
                }
            }
        }

        self.key_order = keys.clone();
        self.series = keys.into_iter().zip(columns).collect();
        self.max_len = self.series.values().map(Vec::len).max().unwrap_or(0);
        println!("Log read from {}: had {} entries", path.display(), self.max_len);
        Ok(())
    }
}
