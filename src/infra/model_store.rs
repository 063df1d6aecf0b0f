// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores a fitted classifier as three files in
// the directory of the configured model path:
//
//   model/
//     model.mpk         ← weights (Burn NamedMpkFileRecorder,
//                          full precision)
//     config.json       ← architecture + training config
//     vocabulary.json   ← tag list and category ids in index order
//
// The config is needed to rebuild a model of the right shape
// before the weights can be loaded into it; the vocabulary is
// needed to turn tags into inputs and outputs into category ids.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::train_use_case::TrainConfig;
use crate::data::vocabulary::Vocabulary;
use crate::ml::model::{VideoClassifier, VideoClassifierConfig};

type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

const CONFIG_FILE:     &str = "config.json";
const VOCABULARY_FILE: &str = "vocabulary.json";

/// Everything needed to rebuild the network and describe the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedConfig {
    pub model:    VideoClassifierConfig,
    pub training: TrainConfig,
}

pub struct ModelStore {
    /// Weights path without extension; the recorder adds `.mpk`
    model_path: PathBuf,
    dir:        PathBuf,
}

impl ModelStore {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        let model_path = model_path.into();
        let dir = model_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { model_path, dir }
    }

    /// Directory holding the weights, config and vocabulary
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the weights file as written by the recorder
    pub fn weights_file(&self) -> PathBuf {
        self.model_path.with_extension("mpk")
    }

    /// Every file a saved model consists of.
    pub fn files(&self) -> [PathBuf; 3] {
        [
            self.weights_file(),
            self.dir.join(CONFIG_FILE),
            self.dir.join(VOCABULARY_FILE),
        ]
    }

    pub fn save_model<B: Backend>(&self, model: &VideoClassifier<B>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;

        ModelRecorder::new()
            .record(model.clone().into_record(), self.model_path.clone())
            .with_context(|| {
                format!("Failed to save model to '{}'", self.weights_file().display())
            })?;

        tracing::info!("Saved model weights to '{}'", self.weights_file().display());
        Ok(())
    }

    /// Load weights into `model`, which must have the saved architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  VideoClassifier<B>,
        device: &B::Device,
    ) -> Result<VideoClassifier<B>> {
        let record = ModelRecorder::new()
            .load(self.model_path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load model '{}'. Have you trained the model first?",
                    self.weights_file().display()
                )
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &SavedConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<SavedConfig> {
        self.read_json(CONFIG_FILE)
    }

    pub fn save_vocabulary(&self, vocab: &Vocabulary) -> Result<()> {
        self.write_json(VOCABULARY_FILE, vocab)
    }

    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        self.read_json(VOCABULARY_FILE)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}
