// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{anyhow, ensure, Result};
use burn::{backend::ndarray::NdArrayDevice, prelude::*};

use crate::data::batcher::rows_to_tensor;
use crate::infra::model_store::ModelStore;
use crate::ml::model::VideoClassifier;
use crate::ml::trainer::EvalBackend;

pub struct Predictor {
    model:    VideoClassifier<EvalBackend>,
    num_tags: usize,
    device:   NdArrayDevice,
}

impl Predictor {
    pub fn new(model: VideoClassifier<EvalBackend>, num_tags: usize) -> Self {
        Self { model, num_tags, device: NdArrayDevice::default() }
    }

    pub fn from_store(store: &ModelStore) -> Result<Self> {
        let device    = NdArrayDevice::default();
        let saved     = store.load_config()?;
        let model     = saved.model.init::<EvalBackend>(&device);
        let model     = store.load_model(model, &device)?;
        tracing::info!("Model loaded from '{}'", store.dir().display());
        Ok(Self { model, num_tags: saved.model.num_tags, device })
    }

    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    /// Softmax probabilities for each input row.
    pub fn predict(&self, inputs: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        for row in inputs {
            ensure!(
                row.len() == self.num_tags,
                "input has {} values but the model expects {}",
                row.len(),
                self.num_tags
            );
        }

        let batch = rows_to_tensor::<EvalBackend>(inputs, self.num_tags, &self.device);
        let probs = self.model.predict_proba(batch);
        let [_, width] = probs.dims();

        let flat = probs
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("cannot read prediction tensor: {e:?}"))?;
        Ok(flat.chunks(width).map(<[f32]>::to_vec).collect())
    }

    /// Prediction for a single input row.
    pub fn predict_one(&self, input: &[f32]) -> Result<Vec<f32>> {
        self.predict(&[input.to_vec()])?
            .pop()
            .ok_or_else(|| anyhow!("model returned no prediction"))
    }
}

/// Index of the largest probability, first on ties.
pub fn argmax(probs: &[f32]) -> Option<usize> {
    probs
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
            Some((_, b)) if b >= p => best,
            _ => Some((i, p)),
        })
        .map(|(i, _)| i)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::VideoClassifierConfig;

    fn predictor() -> Predictor {
        let model = VideoClassifierConfig::new(3, 2).init::<EvalBackend>(&NdArrayDevice::default());
        Predictor::new(model, 3)
    }

    #[test]
    fn test_predict_returns_one_distribution_per_row() {
        let out = predictor().predict(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 1.0]]).unwrap();
        assert_eq!(out.len(), 2);
        for row in out {
            assert_eq!(row.len(), 2);
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        assert!(predictor().predict_one(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(predictor().predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }
}
