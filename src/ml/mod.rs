// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and optimiser code lives here.
//
//   model.rs      — Dense(ReLU) → Dense(softmax) classifier
//                   and the categorical cross-entropy loss
//
//   trainer.rs    — SGD training loop and validation pass
//
//   inferencer.rs — probability predictions from a fitted
//                   or reloaded model
//
//   metrics.rs    — epoch / evaluation records and the
//                   RMSE, MAE, R² diagnostics
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Two-layer dense classifier
pub mod model;

/// Training loop and evaluation
pub mod trainer;

/// Prediction from a fitted model
pub mod inferencer;

/// Metric records and regression diagnostics
pub mod metrics;
