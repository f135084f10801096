// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per training epoch when the user asks
// for it with --metrics-csv. Without that flag nothing is
// written to disk.
//
// Columns:
//   epoch         — epoch number (starts at 1)
//   train_loss    — mean summed cross-entropy per training utterance
//   val_accuracy  — fraction of validation frames classified correctly
//
// Example CSV output:
//   epoch,train_loss,val_accuracy
//   1,152.334120,0.412871
//   2,121.908813,0.497310
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean per-utterance loss over the epoch; NaN if nothing was trained
    pub train_loss: f64,

    /// Validation frame accuracy in [0.0, 1.0]
    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_accuracy: f64) -> Self {
        Self { epoch, train_loss, val_accuracy }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet,
    /// so repeated runs append to the same log.
    pub fn new(csv_path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = csv_path.as_ref().to_path_buf();

        if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,train_loss,val_accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{},{:.6},{:.6}", m.epoch, m.train_loss, m.val_accuracy)?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_accuracy={:.4}",
            m.epoch,
            m.train_loss,
            m.val_accuracy,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
