// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only sees RecordSource, so the JSON
// loader can be swapped for an in-memory source in tests
// without touching the training workflow.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::video::{Category, Video};

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can supply the two record lists a training run needs.
///
/// Implementations:
///   - JsonDatasetLoader → reads videos.json / categories.json from a directory
pub trait RecordSource {
    /// Load every video record, in source order.
    fn load_videos(&self) -> Result<Vec<Video>>;

    /// Load every category record, in source order.
    /// The order defines the category index map.
    fn load_categories(&self) -> Result<Vec<Category>>;

    /// Short identifier for the video data, logged as the `data` run param.
    fn describe(&self) -> String;
}
