// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load videos and categories      (Layer 4 - data)
//   Step 2: Build tag / category indexes    (Layer 4 - data)
//   Step 3: Vectorise every video           (Layer 4 - data)
//   Step 4: Ordered train / validation split(Layer 4 - data)
//   Step 5: Fit the classifier              (Layer 5 - ml)
//   Step 6: Evaluate + last-sample check    (Layer 5 - ml)
//   Step 7: Save model, config, vocabulary  (Layer 6 - infra)
//   Step 8: Record the tracked run          (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{anyhow, ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    dataset::VideoDataset,
    loader::JsonDatasetLoader,
    splitter::split_train_val,
    vectorizer::{vectorize_all, vectorize_input, vectorize_target},
    vocabulary::{CategoryIndex, TagIndex, Vocabulary},
};
use crate::domain::traits::RecordSource;
use crate::infra::{
    model_store::{ModelStore, SavedConfig},
    tracking::{ExperimentTracker, RunInfo},
};
use crate::ml::{
    inferencer::Predictor,
    metrics::{regression_diagnostics, Diagnostics, EpochMetrics, EvaluationScores},
    model::{VideoClassifierConfig, DEFAULT_HIDDEN_NODES},
    trainer::{evaluate, fit},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters and locations for a training run.
// Saved next to the model so a later `predict` knows what it loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:          String,
    pub model_path:        String,
    pub tracking_dir:      String,
    pub experiment_name:   String,
    pub run_name:          String,
    pub epochs:            usize,
    pub training_fraction: f64,
    pub hidden_nodes:      usize,
    pub learning_rate:     f64,
    pub batch_size:        usize,
    pub seed:              u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:          "data".to_string(),
            model_path:        "model/model".to_string(),
            tracking_dir:      "mlruns".to_string(),
            experiment_name:   "aia-deep-learning-sess-001".to_string(),
            run_name:          "deeplearning-11".to_string(),
            epochs:            50,
            training_fraction: 0.8,
            hidden_nodes:      DEFAULT_HIDDEN_NODES,
            learning_rate:     0.01,
            batch_size:        32,
            seed:              42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.training_fraction),
            "training fraction must be within [0, 1], got {}",
            self.training_fraction
        );
        ensure!(self.epochs > 0,       "epochs must be greater than 0");
        ensure!(self.hidden_nodes > 0, "hidden nodes must be greater than 0");
        ensure!(self.batch_size > 0,   "batch size must be greater than 0");
        ensure!(
            self.learning_rate > 0.0,
            "learning rate must be positive, got {}",
            self.learning_rate
        );
        Ok(())
    }
}

/// What a finished run produced, for the CLI to print.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub run:           RunInfo,
    pub history:       Vec<EpochMetrics>,
    pub evaluation:    EvaluationScores,
    pub diagnostics:   Diagnostics,
    pub output_vector: Vec<f32>,
    pub target_vector: Vec<f32>,
    pub weights_file:  PathBuf,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline on `<data_dir>/videos.json` and `<data_dir>/categories.json`.
    pub fn execute(&self) -> Result<TrainReport> {
        let loader = JsonDatasetLoader::new(&self.config.data_dir);
        self.execute_with(&loader)
    }

    pub fn execute_with<S: RecordSource>(&self, source: &S) -> Result<TrainReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load records ──────────────────────────────────────────────
        let videos     = source.load_videos()?;
        let categories = source.load_categories()?;
        ensure!(!videos.is_empty(),     "no videos to train on");
        ensure!(!categories.is_empty(), "category list is empty");
        tracing::debug!("First video: {:?}", videos[0]);
        for c in &categories {
            tracing::debug!("Category {}: {}", c.id, c.title().unwrap_or("-"));
        }

        // ── Step 2: Lookup tables ─────────────────────────────────────────────
        let tag_index      = TagIndex::from_videos(&videos);
        let category_index = CategoryIndex::from_categories(&categories);
        ensure!(!tag_index.is_empty(), "videos carry no tags; vocabulary is empty");
        tracing::info!(
            "Vocabulary: {} tags, {} categories",
            tag_index.len(),
            category_index.len()
        );
        tracing::debug!(
            "First video as vectors: input={:?} target={:?}",
            vectorize_input(&videos[0], &tag_index, tag_index.len()),
            vectorize_target(&videos[0], &category_index, category_index.len()),
        );

        // ── Step 3: Vectorise ─────────────────────────────────────────────────
        let samples = vectorize_all(&videos, &tag_index, &category_index);
        // Single-sample diagnostic below uses the last pair of the whole set
        let last = samples
            .last()
            .cloned()
            .ok_or_else(|| anyhow!("no samples after vectorisation"))?;

        // ── Step 4: Ordered split ─────────────────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.training_fraction);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 5: Fit ───────────────────────────────────────────────────────
        let model_cfg = VideoClassifierConfig::new(tag_index.len(), category_index.len())
            .with_num_hidden(cfg.hidden_nodes);
        let outcome = fit(cfg, &model_cfg, VideoDataset::new(train_samples))?;

        // ── Step 6: Evaluate ──────────────────────────────────────────────────
        let evaluation = evaluate(&outcome.model, VideoDataset::new(val_samples), cfg.batch_size);

        // Only the final sample is compared, not the validation set as a
        // whole. Kept for parity with earlier runs; do not read it as a
        // measure of model quality.
        let predictor     = Predictor::new(outcome.model.clone(), tag_index.len());
        let output_vector = predictor.predict_one(&last.input)?;
        let diagnostics   = regression_diagnostics(&last.target, &output_vector)?;

        // ── Step 7: Save model ────────────────────────────────────────────────
        let store = ModelStore::new(&cfg.model_path);
        store.save_model(&outcome.model)?;
        store.save_config(&SavedConfig { model: model_cfg, training: cfg.clone() })?;
        store.save_vocabulary(&Vocabulary::new(&tag_index, &category_index))?;

        // ── Step 8: Tracked run ───────────────────────────────────────────────
        let run = self.record_run(
            source,
            &store,
            &outcome.history,
            &evaluation,
            &diagnostics,
        )?;

        Ok(TrainReport {
            run,
            history: outcome.history,
            evaluation,
            diagnostics,
            output_vector,
            target_vector: last.target,
            weights_file: store.weights_file(),
        })
    }

    fn record_run<S: RecordSource>(
        &self,
        source:      &S,
        store:       &ModelStore,
        history:     &[EpochMetrics],
        evaluation:  &EvaluationScores,
        diagnostics: &Diagnostics,
    ) -> Result<RunInfo> {
        let cfg        = &self.config;
        let tracker    = ExperimentTracker::new(&cfg.tracking_dir);
        let experiment = tracker.set_experiment(&cfg.experiment_name)?;
        let run        = tracker.start_run(&experiment, &cfg.run_name)?;
        tracing::info!(
            "Run {} writes artifacts to '{}'",
            run.info().run_id,
            run.artifact_dir().display()
        );

        for (name, value) in evaluation.named() {
            run.log_metric(name, value)?;
        }
        run.log_metric("rmse", diagnostics.rmse)?;
        run.log_metric("r2",   diagnostics.r2)?;
        run.log_metric("mae",  diagnostics.mae)?;

        for m in history {
            run.log_metric_at_step("train_loss",     m.train_loss,     m.epoch as u64)?;
            run.log_metric_at_step("train_accuracy", m.train_accuracy, m.epoch as u64)?;
        }

        run.log_param("epoch", cfg.epochs)?;
        run.log_param("data",  source.describe())?;

        for file in store.files() {
            run.log_artifact(&file, Some("model"))?;
        }
        run.log_artifacts(Path::new(&cfg.data_dir), None)?;

        Ok(run.finish()?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{CATEGORIES_FILE, VIDEOS_FILE};
    use crate::infra::tracking::RunStatus;
    use std::fs;

    fn write_dataset(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        let videos: Vec<serde_json::Value> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    serde_json::json!({"tags": ["drama", "tears"], "target_category_id": 5})
                } else {
                    serde_json::json!({"tags": ["comedy", "laughs"], "target_category_id": 9})
                }
            })
            .collect();
        fs::write(dir.join(VIDEOS_FILE), serde_json::to_string(&videos).unwrap()).unwrap();
        fs::write(
            dir.join(CATEGORIES_FILE),
            r#"[{"id": 5, "title": "Drama"}, {"id": 9, "title": "Comedy"}]"#,
        )
        .unwrap();
    }

    fn config_in(root: &Path) -> TrainConfig {
        TrainConfig {
            data_dir:     root.join("data").display().to_string(),
            model_path:   root.join("model").join("model").display().to_string(),
            tracking_dir: root.join("mlruns").display().to_string(),
            epochs:       3,
            batch_size:   4,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad = [
            TrainConfig { training_fraction: 1.5, ..TrainConfig::default() },
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { hidden_nodes: 0, ..TrainConfig::default() },
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { learning_rate: 0.0, ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn test_end_to_end_run_writes_model_and_tracked_run() {
        let tmp = tempfile::tempdir().unwrap();
        write_dataset(&tmp.path().join("data"));
        let cfg = config_in(tmp.path());

        let report = TrainUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(report.history.len(), 3);
        assert_eq!(report.output_vector.len(), 2);
        // last video is index 9 → category 9 → slot 1
        assert_eq!(report.target_vector, vec![0.0, 1.0]);
        assert!(report.weights_file.is_file());
        assert!(report.diagnostics.rmse.is_finite());

        let tracker    = ExperimentTracker::new(&cfg.tracking_dir);
        let experiment = tracker.get_experiment_by_name(&cfg.experiment_name).unwrap().unwrap();
        let runs       = tracker.list_runs(&experiment).unwrap();
        assert_eq!(runs.len(), 1);

        let run = &runs[0];
        assert_eq!(run.info.status, RunStatus::Finished);
        assert_eq!(run.info.run_name, "deeplearning-11");
        for key in ["loss", "accuracy", "rmse", "mae", "r2", "train_loss", "train_accuracy"] {
            assert!(run.metrics.contains_key(key), "missing metric {key}");
        }
        assert_eq!(run.params["epoch"], "3");
        assert_eq!(run.params["data"], "videos.json");

        let artifacts = &run.info.artifact_uri;
        assert!(artifacts.join(VIDEOS_FILE).is_file());
        assert!(artifacts.join("model").join("model.mpk").is_file());
        assert!(artifacts.join("model").join("vocabulary.json").is_file());
    }

    #[test]
    fn test_split_uses_floor_of_fraction() {
        // 10 videos at 0.8 → 8 train / 2 validation; a fraction of 0.05
        // leaves nothing to train on and must fail before fitting
        let tmp = tempfile::tempdir().unwrap();
        write_dataset(&tmp.path().join("data"));
        let cfg = TrainConfig { training_fraction: 0.05, ..config_in(tmp.path()) };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(TrainUseCase::new(config_in(tmp.path())).execute().is_err());
    }

    struct InMemory {
        videos:     Vec<crate::domain::video::Video>,
        categories: Vec<crate::domain::video::Category>,
    }

    impl RecordSource for InMemory {
        fn load_videos(&self) -> Result<Vec<crate::domain::video::Video>> {
            Ok(self.videos.clone())
        }
        fn load_categories(&self) -> Result<Vec<crate::domain::video::Category>> {
            Ok(self.categories.clone())
        }
        fn describe(&self) -> String {
            "in-memory".to_string()
        }
    }

    #[test]
    fn test_unknown_target_category_trains_with_zero_target() {
        use crate::domain::video::{Category, Video};

        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("data")).unwrap();
        let source = InMemory {
            videos: vec![
                Video::new(["a"], 1),
                Video::new(["b"], 2),
                Video::new(["a", "b"], 1),
                Video::new(["b"], 77),
            ],
            categories: vec![Category::new(1), Category::new(2)],
        };
        let cfg    = TrainConfig { training_fraction: 0.5, ..config_in(tmp.path()) };
        let report = TrainUseCase::new(cfg.clone()).execute_with(&source).unwrap();

        assert_eq!(report.target_vector, vec![0.0, 0.0]);
        let tracker = ExperimentTracker::new(&cfg.tracking_dir);
        let exp     = tracker.get_experiment_by_name(&cfg.experiment_name).unwrap().unwrap();
        assert_eq!(tracker.list_runs(&exp).unwrap()[0].params["data"], "in-memory");
    }

    #[test]
    fn test_failure_while_recording_marks_run_failed() {
        use crate::domain::video::{Category, Video};

        let tmp    = tempfile::tempdir().unwrap();
        let source = InMemory {
            videos:     vec![Video::new(["a"], 1), Video::new(["b"], 2), Video::new(["a"], 1)],
            categories: vec![Category::new(1), Category::new(2)],
        };
        // data_dir never exists, so copying the raw data fails at the end of step 8
        let cfg = TrainConfig { training_fraction: 0.7, ..config_in(tmp.path()) };
        assert!(TrainUseCase::new(cfg.clone()).execute_with(&source).is_err());

        let tracker = ExperimentTracker::new(&cfg.tracking_dir);
        let exp     = tracker.get_experiment_by_name(&cfg.experiment_name).unwrap().unwrap();
        let runs    = tracker.list_runs(&exp).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].info.status, RunStatus::Failed);
        assert!(runs[0].info.end_time.is_some());
        assert!(runs[0].metrics.contains_key("loss"));
    }
}
