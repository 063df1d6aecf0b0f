// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that touch the filesystem or network:
//
//   model_store.rs       — Saving and loading the fitted model
//                          (Burn recorder) plus its config and
//                          vocabulary as JSON.
//
//   tracking.rs          — Local experiment tracker: named
//                          experiments, runs, params, metrics
//                          and artifacts on disk.
//
//   invocation_client.rs — Blocking HTTP client for the
//                          model-serving endpoint.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model weights, config and vocabulary persistence
pub mod model_store;

/// File-based experiment tracking
pub mod tracking;

/// HTTP client for the inference endpoint
pub mod invocation_client;
