// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams of the pipeline:
//
//   UtteranceSource  — where utterances come from
//                      (NpzLoader reads a directory of .npz files)
//
//   FrameClassifier  — anything that assigns a phoneme class to
//                      every frame of an utterance
//                      (PhonemeModel<B> for every Burn backend)
//
// Evaluation is written against FrameClassifier, not against
// the model type, so accuracy can be checked with a scripted
// classifier in tests and with any backend in production.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::utterance::Utterance;

// ─── UtteranceSource ──────────────────────────────────────────────────────────
/// Any component that can produce a full dataset of utterances.
pub trait UtteranceSource {
    /// Load every utterance. Any malformed item fails the whole load.
    fn load_all(&self) -> Result<Vec<Utterance>>;
}

// ─── FrameClassifier ──────────────────────────────────────────────────────────
/// Any component that predicts one class index per frame.
pub trait FrameClassifier {
    /// Returns exactly `utterance.frames()` class indices.
    fn classify(&self, utterance: &Utterance) -> Result<Vec<usize>>;
}
