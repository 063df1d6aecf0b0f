// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the JSON dataset files and the tensor
// batches the model consumes.
//
//   videos.json / categories.json
//       │
//       ▼
//   JsonDatasetLoader → reads records
//       │
//       ▼
//   TagIndex / CategoryIndex → run-scoped lookup tables
//       │
//       ▼
//   vectorizer        → indicator / one-hot vectors
//       │
//       ▼
//   splitter          → ordered train / validation partition
//       │
//       ▼
//   VideoDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   VideoBatcher      → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads video and category records from JSON files
pub mod loader;

/// Tag vocabulary and category index maps
pub mod vocabulary;

/// Pure functions turning records into vectors
pub mod vectorizer;

/// Ordered train/validation split
pub mod splitter;

/// Implements Burn's Dataset trait for vectorised samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// pandas-split request frames
pub mod payload;
