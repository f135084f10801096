// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One optimiser step per utterance (batch size 1), fixed
// number of epochs, momentum SGD with a fixed learning rate.
//
// Per epoch:
//   1. shuffle the training order and the validation order
//      independently, with the run's RNG
//   2. for each training utterance:
//        loss  = Σ_t cross_entropy(model(x)_t, y_t)
//        grads = loss.backward()
//        model = optim.step(lr, model, grads)
//   3. validation accuracy on model.valid() (no autodiff graph)
//
// Momentum SGD (dampening 0):
//   v = μ*v + g
//   θ = θ - lr * v
//
// There is no checkpointing, early stopping or LR schedule.
// Any error inside an epoch aborts the whole run.
//
// Reference: Graves & Schmidhuber (2005) §4, Burn Book §5

use anyhow::{ensure, Context, Result};
use burn::{
    module::AutodiffModule,
    optim::{momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::rngs::StdRng;

use crate::application::train_use_case::TrainConfig;
use crate::data::splitter::shuffle_in_place;
use crate::domain::utterance::Utterance;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::evaluator::evaluate_accuracy;
use crate::ml::model::PhonemeModel;

pub struct Trainer<'a> {
    epochs:   usize,
    lr:       f64,
    momentum: f64,
    rng:      StdRng,
    metrics:  Option<&'a MetricsLogger>,
}

impl<'a> Trainer<'a> {
    pub fn new(cfg: &TrainConfig, rng: StdRng) -> Self {
        Self {
            epochs:   cfg.epochs,
            lr:       cfg.lr,
            momentum: cfg.momentum,
            rng,
            metrics:  None,
        }
    }

    /// Also append every epoch's metrics to a CSV log.
    pub fn with_metrics(mut self, logger: &'a MetricsLogger) -> Self {
        self.metrics = Some(logger);
        self
    }

    /// Train `model` on `train`, checking accuracy on `valid` after each epoch.
    ///
    /// Both slices are reordered in place by the per-epoch shuffles.
    pub fn fit<B: AutodiffBackend>(
        &mut self,
        mut model: PhonemeModel<B>,
        train:     &mut [Utterance],
        valid:     &mut [Utterance],
    ) -> Result<(PhonemeModel<B>, Vec<EpochMetrics>)> {
        let mut optim = SgdConfig::new()
            .with_momentum(Some(
                MomentumConfig::new()
                    .with_momentum(self.momentum)
                    .with_dampening(0.0),
            ))
            .init::<B, PhonemeModel<B>>();

        let mut history: Vec<EpochMetrics> = Vec::with_capacity(self.epochs);

        for epoch in 1..=self.epochs {
            println!("Epoch {}/{}", epoch, self.epochs);

            shuffle_in_place(train, &mut self.rng);
            shuffle_in_place(valid, &mut self.rng);

            // ── Training phase ────────────────────────────────────────────────
            let mut loss_sum = 0.0f64;
            for (i, utterance) in train.iter().enumerate() {
                let loss = model
                    .loss(utterance)
                    .with_context(|| format!("Training utterance {i} in epoch {epoch}"))?;

                let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
                ensure!(
                    loss_val.is_finite(),
                    "Non-finite loss ({loss_val}) on training utterance {i} in epoch {epoch}"
                );
                loss_sum += loss_val;

                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(self.lr, model, grads);
            }

            let train_loss = if train.is_empty() {
                f64::NAN
            } else {
                loss_sum / train.len() as f64
            };

            // ── Validation phase ──────────────────────────────────────────────
            let val_accuracy = evaluate_accuracy(&model.valid(), valid.iter())
                .with_context(|| format!("Validation in epoch {epoch}"))?;
            println!("Validation accuracy: {:.4}", val_accuracy);
            tracing::info!(
                "Epoch {}/{} | train_loss={:.4} | val_accuracy={:.4}",
                epoch, self.epochs, train_loss, val_accuracy,
            );

            let m = EpochMetrics::new(epoch, train_loss, val_accuracy);
            if let Some(logger) = self.metrics {
                logger.log(&m)?;
            }
            history.push(m);
        }

        Ok((model, history))
    }
}
