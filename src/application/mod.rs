// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per use case (train, predict offline, or call a
// serving endpoint).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - No direct parsing of dataset files (that's Layer 4)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Offline scoring with a saved model
pub mod predict_use_case;

// Posting a payload to a serving endpoint
pub mod invoke_use_case;
