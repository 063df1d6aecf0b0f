// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch SGD on categorical cross-entropy, then a separate
// evaluation pass over the validation partition.
//
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//   - Validation batcher must also use EvalBackend
//   - The data loader reshuffles the TRAINING batches each epoch;
//     the train/validation partition itself is never shuffled
//
// Reference: Burn Book §5 (Training), Robbins & Monro (1951) SGD

use anyhow::{ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer, SgdConfig},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::VideoBatcher, dataset::VideoDataset};
use crate::ml::metrics::{EpochMetrics, EvaluationScores};
use crate::ml::model::{categorical_cross_entropy, count_correct, VideoClassifier, VideoClassifierConfig};

pub type TrainBackend = Autodiff<NdArray>;
pub type EvalBackend  = NdArray;

/// A fitted model (already detached from autodiff) and its epoch history.
pub struct FitOutcome {
    pub model:   VideoClassifier<EvalBackend>,
    pub history: Vec<EpochMetrics>,
}

pub fn fit(
    cfg:           &TrainConfig,
    model_cfg:     &VideoClassifierConfig,
    train_dataset: VideoDataset,
) -> Result<FitOutcome> {
    ensure!(
        train_dataset.sample_count() > 0,
        "training partition is empty; add videos or raise the training fraction"
    );

    let device = NdArrayDevice::default();
    TrainBackend::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: VideoClassifier<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} tags → {} hidden → {} categories",
        model_cfg.num_tags, model_cfg.num_hidden, model_cfg.num_categories
    );

    // ── Plain SGD, no momentum ────────────────────────────────────────────────
    // θ = θ - lr * g
    let mut optim = SgdConfig::new().init();

    let train_batcher = VideoBatcher::<TrainBackend>::new(device);
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let mut history = Vec::with_capacity(cfg.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let rows = batch.inputs.dims()[0];
            let (loss, logits) = model.forward_loss(batch.inputs, batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val * rows as f64;
            correct  += count_correct(logits, batch.targets);
            seen     += rows;

            // Backward pass + SGD update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let metrics = EpochMetrics::new(
            epoch,
            loss_sum / seen as f64,
            correct as f64 / seen as f64,
        );

        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.1}%",
            epoch, cfg.epochs, metrics.train_loss, metrics.train_accuracy * 100.0,
        );
        history.push(metrics);
    }

    tracing::info!("Training complete after {} epochs", cfg.epochs);
    Ok(FitOutcome { model: model.valid(), history })
}

/// Loss and categorical accuracy over `dataset`, weighted by sample.
/// An empty dataset gives NaN loss and zero accuracy.
pub fn evaluate(
    model:      &VideoClassifier<EvalBackend>,
    dataset:    VideoDataset,
    batch_size: usize,
) -> EvaluationScores {
    if dataset.is_empty() {
        tracing::warn!("Validation partition is empty; scores are undefined");
        return EvaluationScores { loss: f64::NAN, accuracy: 0.0 };
    }

    let val_batcher = VideoBatcher::<EvalBackend>::new(NdArrayDevice::default());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut seen     = 0usize;

    for batch in val_loader.iter() {
        let rows   = batch.inputs.dims()[0];
        let logits = model.forward(batch.inputs);

        let batch_loss: f64 = categorical_cross_entropy(logits.clone(), batch.targets.clone())
            .into_scalar().elem::<f64>();
        loss_sum += batch_loss * rows as f64;
        correct  += count_correct(logits, batch.targets);
        seen     += rows;
    }

    let scores = EvaluationScores {
        loss:     loss_sum / seen as f64,
        accuracy: correct as f64 / seen as f64,
    };
    tracing::info!(
        "Validation: loss={:.4} accuracy={:.1}% over {} samples",
        scores.loss, scores.accuracy * 100.0, seen
    );
    scores
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::VideoSample;

    fn separable_samples() -> Vec<VideoSample> {
        // tag 0 → category 0, tag 1 → category 1
        (0..16)
            .map(|i| {
                if i % 2 == 0 {
                    VideoSample { input: vec![1.0, 0.0], target: vec![1.0, 0.0] }
                } else {
                    VideoSample { input: vec![0.0, 1.0], target: vec![0.0, 1.0] }
                }
            })
            .collect()
    }

    fn quick_config(epochs: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            batch_size:    4,
            learning_rate: 0.5,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_fit_records_one_entry_per_epoch() {
        let cfg       = quick_config(3);
        let model_cfg = VideoClassifierConfig::new(2, 2).with_num_hidden(8);
        let outcome   = fit(&cfg, &model_cfg, VideoDataset::new(separable_samples())).unwrap();

        assert_eq!(outcome.history.len(), 3);
        assert_eq!(outcome.history[2].epoch, 3);
        assert!(outcome.history.iter().all(|m| m.train_loss.is_finite()));
    }

    #[test]
    fn test_fit_learns_a_separable_problem() {
        let cfg       = quick_config(60);
        let model_cfg = VideoClassifierConfig::new(2, 2).with_num_hidden(8);
        let outcome   = fit(&cfg, &model_cfg, VideoDataset::new(separable_samples())).unwrap();

        let first = outcome.history.first().unwrap().train_loss;
        let last  = outcome.history.last().unwrap().train_loss;
        assert!(last < first, "loss did not decrease: {first} → {last}");
    }

    #[test]
    fn test_fit_rejects_empty_training_set() {
        let model_cfg = VideoClassifierConfig::new(2, 2);
        assert!(fit(&quick_config(1), &model_cfg, VideoDataset::new(vec![])).is_err());
    }

    #[test]
    fn test_evaluate_empty_validation_is_nan() {
        let model  = VideoClassifierConfig::new(2, 2).init::<EvalBackend>(&NdArrayDevice::default());
        let scores = evaluate(&model, VideoDataset::new(vec![]), 4);
        assert!(scores.loss.is_nan());
        assert_eq!(scores.accuracy, 0.0);
    }

    #[test]
    fn test_evaluate_accuracy_is_a_fraction() {
        let model  = VideoClassifierConfig::new(2, 2).init::<EvalBackend>(&NdArrayDevice::default());
        let scores = evaluate(&model, VideoDataset::new(separable_samples()), 5);
        assert!(scores.loss.is_finite());
        assert!((0.0..=1.0).contains(&scores.accuracy));
    }
}
