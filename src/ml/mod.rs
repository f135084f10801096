// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn framework specific code lives here.
//
//   model.rs     — BLSTM + dense + softmax phoneme classifier
//                  and the summed cross-entropy loss
//
//   trainer.rs   — Epoch loop: shuffle, one momentum-SGD step
//                  per utterance, validation accuracy
//
//   evaluator.rs — Frame accuracy over any FrameClassifier
//
// Backend: NdArray (CPU) by default; build with
// `--features wgpu` to train on the GPU instead.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Graves & Schmidhuber (2005) Framewise phoneme
//            classification with bidirectional LSTM networks

use burn::tensor::backend::Backend;

/// BLSTM phoneme classifier architecture and loss
pub mod model;

/// Training loop with per-epoch validation
pub mod trainer;

/// Frame-level accuracy
pub mod evaluator;

#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

/// Backend with gradient tracking, used for training
pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;

pub fn default_device() -> <TrainBackend as Backend>::Device {
    Default::default()
}
