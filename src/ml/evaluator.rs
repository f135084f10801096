// ============================================================
// Layer 5 — Frame Accuracy Evaluator
// ============================================================
// accuracy = (# frames whose predicted class == true class)
//            / (# frames across every utterance)
//
// Frames are pooled across utterances, so a long utterance
// weighs more than a short one.
//
// Class indices come from argmax on the host, not on the
// device, so tie-breaking is fixed: the FIRST maximum wins.
// The same argmax turns one-hot labels into true indices.

use anyhow::{ensure, Result};
use burn::prelude::*;

use crate::domain::traits::FrameClassifier;
use crate::domain::utterance::Utterance;
use crate::ml::model::PhonemeModel;

/// Index of the largest value; ties resolve to the lowest index.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// True class index of every frame of an utterance.
pub fn true_classes(utterance: &Utterance) -> Vec<usize> {
    utterance
        .labels()
        .rows()
        .into_iter()
        .map(|row| argmax(&row.to_vec()))
        .collect()
}

/// Fraction of correctly classified frames over all `utterances`.
///
/// Returns 0.0 when there are no frames at all.
pub fn evaluate_accuracy<'a, C, I>(classifier: &C, utterances: I) -> Result<f64>
where
    C: FrameClassifier + ?Sized,
    I: IntoIterator<Item = &'a Utterance>,
{
    let mut correct: Vec<bool> = Vec::new();

    for utterance in utterances {
        let truth     = true_classes(utterance);
        let predicted = classifier.classify(utterance)?;
        ensure!(
            predicted.len() == truth.len(),
            "classifier returned {} predictions for {} frames",
            predicted.len(),
            truth.len()
        );
        correct.extend(predicted.iter().zip(&truth).map(|(p, t)| p == t));
    }

    if correct.is_empty() {
        return Ok(0.0);
    }
    let hits = correct.iter().filter(|&&c| c).count();
    Ok(hits as f64 / correct.len() as f64)
}

impl<B: Backend> FrameClassifier for PhonemeModel<B> {
    fn classify(&self, utterance: &Utterance) -> Result<Vec<usize>> {
        let probs = self
            .predict(utterance)?
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read predictions: {e:?}"))?;

        Ok(probs.chunks(self.n_classes).map(argmax).collect())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use ndarray::Array2;

    use crate::domain::utterance::{N_CLASSES, N_FEATURES};
    use crate::ml::model::PhonemeModelConfig;

    /// Replays the true labels, optionally shifted by a fixed offset.
    struct Scripted {
        offset: usize,
    }

    impl FrameClassifier for Scripted {
        fn classify(&self, utterance: &Utterance) -> Result<Vec<usize>> {
            Ok(true_classes(utterance)
                .into_iter()
                .map(|c| (c + self.offset) % N_CLASSES)
                .collect())
        }
    }

    struct Truncating;

    impl FrameClassifier for Truncating {
        fn classify(&self, _utterance: &Utterance) -> Result<Vec<usize>> {
            Ok(vec![0])
        }
    }

    fn utterance(classes: &[usize]) -> Utterance {
        let mut y = Array2::zeros((classes.len(), N_CLASSES));
        for (t, &c) in classes.iter().enumerate() {
            y[[t, c]] = 1.0;
        }
        Utterance::new(Array2::zeros((classes.len(), N_FEATURES)), y).unwrap()
    }

    #[test]
    fn test_argmax_first_maximum_wins() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), 0);
        assert_eq!(argmax(&[0.1, 0.3, 0.3, 0.3]), 1);
        assert_eq!(argmax(&[5.0]), 0);
    }

    #[test]
    fn test_perfect_classifier_scores_one() {
        let data = vec![utterance(&[0, 1, 2]), utterance(&[60, 5])];
        let acc  = evaluate_accuracy(&Scripted { offset: 0 }, &data).unwrap();
        assert_eq!(acc, 1.0);
    }

    #[test]
    fn test_always_wrong_classifier_scores_zero() {
        let data = vec![utterance(&[0, 1, 2]), utterance(&[60, 5])];
        let acc  = evaluate_accuracy(&Scripted { offset: 1 }, &data).unwrap();
        assert_eq!(acc, 0.0);
    }

    #[test]
    fn test_accuracy_pools_frames_across_utterances() {
        struct ZeroClass;
        impl FrameClassifier for ZeroClass {
            fn classify(&self, utterance: &Utterance) -> Result<Vec<usize>> {
                Ok(vec![0; utterance.frames()])
            }
        }

        // 1 of 1 correct, then 1 of 3 correct → 2 / 4 frames
        let data = vec![utterance(&[0]), utterance(&[0, 3, 4])];
        let acc  = evaluate_accuracy(&ZeroClass, &data).unwrap();
        assert!((acc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let acc = evaluate_accuracy(&Scripted { offset: 0 }, &Vec::<Utterance>::new()).unwrap();
        assert_eq!(acc, 0.0);
    }

    #[test]
    fn test_prediction_count_mismatch_is_an_error() {
        let data = vec![utterance(&[0, 1, 2])];
        assert!(evaluate_accuracy(&Truncating, &data).is_err());
    }

    #[test]
    fn test_model_classifies_every_frame_deterministically() {
        let device = Default::default();
        let model  = PhonemeModelConfig::new().init::<NdArray>(&device);
        let u = utterance(&[3, 1, 4, 1, 5]);

        let first = model.classify(&u).unwrap();
        assert_eq!(first.len(), 5);
        assert!(first.iter().all(|&c| c < N_CLASSES));
        assert_eq!(first, model.classify(&u).unwrap());
    }
}
