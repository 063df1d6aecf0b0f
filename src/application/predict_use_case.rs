// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Offline scoring with a saved model:
//   1. Load config, weights and vocabulary from the model dir
//   2. Build input rows from a pandas-split file or from tags
//   3. Run the classifier and map each argmax back to a category id

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::data::{payload::SplitFrame, vectorizer::vectorize_tags, vocabulary::Vocabulary};
use crate::domain::video::CategoryId;
use crate::infra::model_store::ModelStore;
use crate::ml::inferencer::{argmax, Predictor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    pub model_path: String,
    /// pandas-split JSON file; takes precedence over `tags`
    pub input:      Option<String>,
    pub tags:       Vec<String>,
}

/// Probabilities for one input row and the category they point at.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
    pub category_id:   Option<CategoryId>,
}

pub struct PredictUseCase {
    predictor:  Predictor,
    vocabulary: Vocabulary,
}

impl PredictUseCase {
    pub fn new(model_path: &str) -> Result<Self> {
        let store      = ModelStore::new(model_path);
        let predictor  = Predictor::from_store(&store)?;
        let vocabulary = store.load_vocabulary()?;
        Ok(Self { predictor, vocabulary })
    }

    pub fn execute(&self, cfg: &PredictConfig) -> Result<Vec<Prediction>> {
        let rows = match (&cfg.input, cfg.tags.is_empty()) {
            (Some(path), _) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Cannot read input file '{path}'"))?;
                let frame: SplitFrame = serde_json::from_str(&text)
                    .with_context(|| format!("'{path}' is not a pandas-split frame"))?;
                frame.validate_width(self.predictor.num_tags())?;
                frame.data
            }
            (None, false) => vec![self.rows_for_tags(&cfg.tags)],
            (None, true)  => bail!("nothing to predict: pass an input file or at least one tag"),
        };
        self.predict_rows(&rows)
    }

    /// Multi-hot row for `tags`; tags the model never saw are dropped.
    pub fn rows_for_tags(&self, tags: &[String]) -> Vec<f32> {
        let tag_index = self.vocabulary.tag_index();
        let unknown: Vec<_> = tags.iter().filter(|t| tag_index.get(t).is_none()).collect();
        if !unknown.is_empty() {
            tracing::warn!("Ignoring unknown tags: {:?}", unknown);
        }
        vectorize_tags(tags, &tag_index, self.predictor.num_tags())
    }

    pub fn predict_rows(&self, rows: &[Vec<f32>]) -> Result<Vec<Prediction>> {
        let category_index = self.vocabulary.category_index();
        let predictions = self
            .predictor
            .predict(rows)?
            .into_iter()
            .map(|probabilities| {
                let category_id = argmax(&probabilities)
                    .and_then(|i| category_index.id_at(i))
                    .cloned();
                Prediction { probabilities, category_id }
            })
            .collect();
        Ok(predictions)
    }
}
