// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full pipeline in order:
//
//   Step 1: Seed the run                      (burn + rand)
//   Step 2: Load <data_dir>/train             (Layer 4 - data)
//   Step 3: Split validation / training       (Layer 4 - data)
//   Step 4: Build the BLSTM model             (Layer 5 - ml)
//   Step 5: Train with per-epoch validation   (Layer 5 - ml)
//   Step 6: Drop train/validation data
//   Step 7: Load <data_dir>/test and evaluate (Layer 4 + 5)
//
// The train and validation sets live only inside the block
// that trains the model, so their memory is released before
// the test set is read.

use anyhow::{ensure, Context, Result};
use burn::{module::AutodiffModule, tensor::backend::Backend};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{loader::NpzLoader, splitter::split_validation};
use crate::domain::traits::UtteranceSource;
use crate::infra::metrics::MetricsLogger;
use crate::ml::{
    default_device,
    evaluator::evaluate_accuracy,
    model::timit_config,
    trainer::Trainer,
    TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Defaults reproduce the reference setup exactly:
// lr 1e-5, momentum 0.9, 20 epochs, 93 hidden units per
// direction, first 184 utterances held out for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:        String,
    pub epochs:          usize,
    pub lr:              f64,
    pub momentum:        f64,
    pub hidden_size:     usize,
    pub validation_size: usize,
    pub seed:            Option<u64>,
    pub metrics_csv:     Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:        "data".to_string(),
            epochs:          20,
            lr:              1e-5,
            momentum:        0.9,
            hidden_size:     93,
            validation_size: 184,
            seed:            None,
            metrics_csv:     None,
        }
    }
}

/// What a finished run reports back to the CLI
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub seed:                u64,
    pub final_val_accuracy:  Option<f64>,
    pub test_accuracy:       f64,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full pipeline end to end
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;
        tracing::info!("Training config: {}", serde_json::to_string(cfg)?);
        ensure!(cfg.hidden_size > 0, "hidden_size must be at least 1");

        // ── Step 1: Seed ──────────────────────────────────────────────────────
        // Unseeded runs draw a seed and log it, so any run can be replayed.
        let seed   = cfg.seed.unwrap_or_else(rand::random);
        let device = default_device();
        TrainBackend::seed(&device, seed);
        tracing::info!("Run seed: {}", seed);

        let metrics = cfg
            .metrics_csv
            .as_ref()
            .map(MetricsLogger::new)
            .transpose()?;

        let data_dir = PathBuf::from(&cfg.data_dir);

        let (model, history) = {
            // ── Step 2: Load training directory ───────────────────────────────
            let utterances = NpzLoader::new(data_dir.join("train"))
                .load_all()
                .context("Loading training data")?;

            // ── Step 3: Positional split ──────────────────────────────────────
            let (mut valid, mut train) = split_validation(utterances, cfg.validation_size);
            tracing::info!("Split: {} validation, {} train", valid.len(), train.len());

            // ── Step 4: Model ─────────────────────────────────────────────────
            let model = timit_config(cfg.hidden_size).init::<TrainBackend>(&device);
            tracing::info!("Model ready: BLSTM 2x{} hidden", cfg.hidden_size);

            // ── Step 5: Train ─────────────────────────────────────────────────
            let mut trainer = Trainer::new(cfg, StdRng::seed_from_u64(seed));
            if let Some(logger) = &metrics {
                tracing::info!("Writing epoch metrics to '{}'", logger.csv_path().display());
                trainer = trainer.with_metrics(logger);
            }
            trainer.fit(model, &mut train, &mut valid)?

            // ── Step 6: train/valid dropped at end of scope ───────────────────
        };

        // ── Step 7: Test set ──────────────────────────────────────────────────
        let test = NpzLoader::new(data_dir.join("test"))
            .load_all()
            .context("Loading test data")?;
        let test_accuracy = evaluate_accuracy(&model.valid(), &test)
            .context("Evaluating test data")?;
        tracing::info!("Test accuracy over {} utterances: {:.4}", test.len(), test_accuracy);

        let report = TrainReport {
            seed,
            final_val_accuracy: history.last().map(|m| m.val_accuracy),
            test_accuracy,
        };
        tracing::info!("Run report: {}", serde_json::to_string(&report)?);
        Ok(report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use ndarray_npy::NpzWriter;
    use std::{fs::{self, File}, path::Path};

    use crate::domain::utterance::{N_CLASSES, N_FEATURES};

    fn write_utterances(dir: &Path, count: usize) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..count {
            let frames = 2 + i % 3;
            let x = Array2::from_shape_fn((frames, N_FEATURES), |(t, f)| ((i + t + f) % 5) as f32);
            let y = Array2::from_shape_fn((frames, N_CLASSES), |(t, c)| {
                if c == (i + t) % N_CLASSES { 1.0f32 } else { 0.0 }
            });
            let mut npz = NpzWriter::new(File::create(dir.join(format!("utt{i:03}.npz"))).unwrap());
            npz.add_array("x", &x).unwrap();
            npz.add_array("y", &y).unwrap();
            npz.finish().unwrap();
        }
    }

    #[test]
    fn test_default_config_matches_reference_setup() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.epochs, 20);
        assert_eq!(cfg.lr, 1e-5);
        assert_eq!(cfg.momentum, 0.9);
        assert_eq!(cfg.hidden_size, 93);
        assert_eq!(cfg.validation_size, 184);
    }

    #[test]
    fn test_end_to_end_on_tiny_corpus() {
        let dir = tempfile::tempdir().unwrap();
        write_utterances(&dir.path().join("train"), 6);
        write_utterances(&dir.path().join("test"), 2);
        let csv = dir.path().join("metrics.csv");

        let report = TrainUseCase::new(TrainConfig {
            data_dir:        dir.path().to_string_lossy().into_owned(),
            epochs:          2,
            hidden_size:     8,
            validation_size: 2,
            seed:            Some(3),
            metrics_csv:     Some(csv.to_string_lossy().into_owned()),
            ..TrainConfig::default()
        })
        .execute()
        .unwrap();

        assert_eq!(report.seed, 3);
        assert!(report.final_val_accuracy.is_some());
        assert!((0.0..=1.0).contains(&report.test_accuracy));
        assert_eq!(fs::read_to_string(csv).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_missing_test_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_utterances(&dir.path().join("train"), 3);

        let result = TrainUseCase::new(TrainConfig {
            data_dir:        dir.path().to_string_lossy().into_owned(),
            epochs:          0,
            hidden_size:     4,
            validation_size: 1,
            seed:            Some(1),
            ..TrainConfig::default()
        })
        .execute();

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_hidden_size_fails_before_loading() {
        let dir = tempfile::tempdir().unwrap();

        let err = TrainUseCase::new(TrainConfig {
            data_dir:    dir.path().to_string_lossy().into_owned(),
            hidden_size: 0,
            ..TrainConfig::default()
        })
        .execute()
        .unwrap_err();

        assert!(err.to_string().contains("hidden_size"));
    }

    #[test]
    fn test_report_serializes_as_json() {
        let report = TrainReport { seed: 7, final_val_accuracy: None, test_accuracy: 0.5 };
        let json   = serde_json::to_value(&report).unwrap();

        assert_eq!(json["seed"], 7);
        assert!(json["final_val_accuracy"].is_null());
        assert_eq!(json["test_accuracy"], 0.5);
    }
}
