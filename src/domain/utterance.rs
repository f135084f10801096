// ============================================================
// Layer 3 — Utterance Domain Type
// ============================================================
// One spoken sample: a sequence of acoustic frames plus the
// phoneme label of every frame.
//
//   features: [frames, 26]  — MFCC-style feature vectors
//   labels:   [frames, 61]  — one-hot phoneme classes
//
// Row t of `features` and row t of `labels` describe the same
// 10ms frame, so both arrays must have the same row count.
// That invariant is checked once here, at construction, and
// every later layer relies on it.
//
// Reference: Graves & Schmidhuber (2005), TIMIT phone set

use ndarray::Array2;
use thiserror::Error;

/// Width of one feature frame (12 MFCC + energy, plus deltas)
pub const N_FEATURES: usize = 26;

/// Number of TIMIT phoneme classes
pub const N_CLASSES: usize = 61;

/// Violations of the frame alignment invariant
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UtteranceError {
    #[error("feature frames ({features}) and label frames ({labels}) differ")]
    LengthMismatch { features: usize, labels: usize },

    #[error("utterance has no frames")]
    Empty,
}

/// A frame-aligned (features, labels) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    features: Array2<f32>,
    labels:   Array2<f32>,
}

impl Utterance {
    pub fn new(features: Array2<f32>, labels: Array2<f32>) -> Result<Self, UtteranceError> {
        let (f_rows, l_rows) = (features.nrows(), labels.nrows());
        if f_rows != l_rows {
            return Err(UtteranceError::LengthMismatch { features: f_rows, labels: l_rows });
        }
        if f_rows == 0 {
            return Err(UtteranceError::Empty);
        }
        Ok(Self { features, labels })
    }

    /// Number of frames (time steps)
    pub fn frames(&self) -> usize {
        self.features.nrows()
    }

    pub fn feature_width(&self) -> usize {
        self.features.ncols()
    }

    pub fn label_width(&self) -> usize {
        self.labels.ncols()
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn labels(&self) -> &Array2<f32> {
        &self.labels
    }
}
