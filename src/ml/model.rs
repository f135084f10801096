use anyhow::{ensure, Result};
use burn::{
    nn::{Linear, LinearConfig, Lstm, LstmConfig},
    prelude::*,
    tensor::activation::{log_softmax, softmax},
};

use crate::domain::utterance::{Utterance, N_CLASSES, N_FEATURES};

// ─── BLSTM ────────────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct BlstmConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
}

impl BlstmConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Blstm<B> {
        Blstm {
            forward_lstm:  LstmConfig::new(self.d_input, self.d_hidden, true).init(device),
            backward_lstm: LstmConfig::new(self.d_input, self.d_hidden, true).init(device),
        }
    }
}

/// Two independent LSTMs over the same sequence, one per time direction.
///
/// Neither LSTM keeps state between calls: both start from the zero
/// state on every `forward`, so nothing carries over from one utterance
/// to the next.
#[derive(Module, Debug)]
pub struct Blstm<B: Backend> {
    pub forward_lstm:  Lstm<B>,
    pub backward_lstm: Lstm<B>,
}

impl<B: Backend> Blstm<B> {
    /// x: [batch, frames, d_input] → [batch, frames, 2 * d_hidden]
    ///
    /// Feature layout per frame is `[forward | backward]`.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let (fwd, _) = self.forward_lstm.forward(x.clone(), None);

        // Run right-to-left, then flip back so row t is frame t in both halves.
        let (bwd, _) = self.backward_lstm.forward(x.flip([1]), None);
        let bwd = bwd.flip([1]);

        Tensor::cat(vec![fwd, bwd], 2)
    }
}

// ─── Phoneme classifier ───────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct PhonemeModelConfig {
    #[config(default = 26)]
    pub n_features: usize,
    #[config(default = 93)]
    pub d_hidden:   usize,
    #[config(default = 61)]
    pub n_classes:  usize,
}

impl PhonemeModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PhonemeModel<B> {
        PhonemeModel {
            blstm:      BlstmConfig::new(self.n_features, self.d_hidden).init(device),
            output:     LinearConfig::new(2 * self.d_hidden, self.n_classes).init(device),
            n_features: self.n_features,
            n_classes:  self.n_classes,
        }
    }
}

/// BLSTM → per-frame dense layer → softmax over phoneme classes.
#[derive(Module, Debug)]
pub struct PhonemeModel<B: Backend> {
    pub blstm:      Blstm<B>,
    pub output:     Linear<B>,
    pub n_features: usize,
    pub n_classes:  usize,
}

impl<B: Backend> PhonemeModel<B> {
    /// features: [frames, n_features] → logits: [frames, n_classes]
    pub fn logits(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let [frames, _] = features.dims();

        let hidden = self.blstm.forward(features.unsqueeze::<3>()); // [1, frames, 2h]
        let [_, _, width] = hidden.dims();

        // The dense layer is applied to every frame independently.
        self.output.forward(hidden.reshape([frames, width]))
    }

    /// Per-frame class probabilities, each row summing to 1.
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.logits(features), 1)
    }

    /// Cross-entropy against one-hot `targets`, summed over all frames.
    ///
    /// Uses log_softmax on the logits rather than log(softmax(..)) so an
    /// underflowed probability cannot turn into -inf.
    pub fn forward_loss(&self, features: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        let log_probs = log_softmax(self.logits(features), 1);
        (log_probs * targets).sum().neg()
    }

    /// Shape-checked `forward` on an utterance.
    pub fn predict(&self, utterance: &Utterance) -> Result<Tensor<B, 2>> {
        self.check_features(utterance)?;
        let device = self.device();
        Ok(self.forward(features_tensor(utterance, &device)))
    }

    /// Shape-checked `forward_loss` on an utterance.
    pub fn loss(&self, utterance: &Utterance) -> Result<Tensor<B, 1>> {
        self.check_features(utterance)?;
        ensure!(
            utterance.label_width() == self.n_classes,
            "label width {} does not match model output width {}",
            utterance.label_width(),
            self.n_classes
        );
        let device = self.device();
        Ok(self.forward_loss(
            features_tensor(utterance, &device),
            labels_tensor(utterance, &device),
        ))
    }

    pub fn device(&self) -> B::Device {
        self.output.weight.val().device()
    }

    fn check_features(&self, utterance: &Utterance) -> Result<()> {
        ensure!(
            utterance.feature_width() == self.n_features,
            "feature width {} does not match model input width {}",
            utterance.feature_width(),
            self.n_features
        );
        Ok(())
    }
}

pub fn features_tensor<B: Backend>(utterance: &Utterance, device: &B::Device) -> Tensor<B, 2> {
    matrix_tensor(utterance.features(), device)
}

pub fn labels_tensor<B: Backend>(utterance: &Utterance, device: &B::Device) -> Tensor<B, 2> {
    matrix_tensor(utterance.labels(), device)
}

fn matrix_tensor<B: Backend>(m: &ndarray::Array2<f32>, device: &B::Device) -> Tensor<B, 2> {
    // iter() walks in logical (row-major) order regardless of memory layout
    let values: Vec<f32> = m.iter().copied().collect();
    Tensor::from_data(TensorData::new(values, vec![m.nrows(), m.ncols()]), device)
}

/// Paper configuration: 26 → 2×93 → 61.
pub fn timit_config(d_hidden: usize) -> PhonemeModelConfig {
    PhonemeModelConfig::new()
        .with_n_features(N_FEATURES)
        .with_d_hidden(d_hidden)
        .with_n_classes(N_CLASSES)
}
