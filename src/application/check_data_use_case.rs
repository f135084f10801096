// ============================================================
// Layer 2 — CheckDataUseCase
// ============================================================
// Loads a data directory with exactly the validation the
// training run applies, without building a model. Useful for
// catching a malformed file before a multi-hour run.

use anyhow::Result;
use serde::Serialize;

use crate::data::loader::NpzLoader;
use crate::domain::traits::UtteranceSource;

/// Totals for a successfully validated directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub utterances: usize,
    pub frames:     usize,
    pub min_frames: usize,
    pub max_frames: usize,
}

pub struct CheckDataUseCase {
    dir: String,
}

impl CheckDataUseCase {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn execute(&self) -> Result<DataSummary> {
        let utterances = NpzLoader::new(&self.dir).load_all()?;
        let lengths: Vec<usize> = utterances.iter().map(|u| u.frames()).collect();

        let summary = DataSummary {
            utterances: lengths.len(),
            frames:     lengths.iter().sum(),
            min_frames: lengths.iter().copied().min().unwrap_or(0),
            max_frames: lengths.iter().copied().max().unwrap_or(0),
        };
        tracing::info!("Data summary for '{}': {}", self.dir, serde_json::to_string(&summary)?);
        Ok(summary)
    }
}
