// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Reads the two dataset files from a directory:
//   <dir>/videos.json      — array of video objects
//   <dir>/categories.json  — array of category objects
//
// A missing or malformed file is an error; nothing is skipped.
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{fs, path::{Path, PathBuf}};

use crate::domain::traits::RecordSource;
use crate::domain::video::{Category, Video};

pub const VIDEOS_FILE:     &str = "videos.json";
pub const CATEGORIES_FILE: &str = "categories.json";

/// Loads records from a data directory.
/// Implements the RecordSource trait from Layer 3.
pub struct JsonDatasetLoader {
    dir: PathBuf,
}

impl JsonDatasetLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RecordSource for JsonDatasetLoader {
    fn load_videos(&self) -> Result<Vec<Video>> {
        let videos: Vec<Video> = read_json_array(&self.dir.join(VIDEOS_FILE))?;
        tracing::info!("Loaded {} videos", videos.len());
        Ok(videos)
    }

    fn load_categories(&self) -> Result<Vec<Category>> {
        let categories: Vec<Category> = read_json_array(&self.dir.join(CATEGORIES_FILE))?;
        tracing::info!("Loaded {} categories", categories.len());
        Ok(categories)
    }

    fn describe(&self) -> String {
        VIDEOS_FILE.to_string()
    }
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed JSON in '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::video::CategoryId;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_loads_both_files_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), VIDEOS_FILE, r#"[
            {"tags": ["a"], "target_category_id": 9},
            {"tags": ["b", "c"], "target_category_id": 5}
        ]"#);
        write(tmp.path(), CATEGORIES_FILE, r#"[{"id": 5, "title": "Five"}, {"id": 9}]"#);

        let loader     = JsonDatasetLoader::new(tmp.path());
        let videos     = loader.load_videos().unwrap();
        let categories = loader.load_categories().unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[1].tags, vec!["b", "c"]);
        assert_eq!(categories[0].id, CategoryId::Int(5));
        assert_eq!(categories[0].title(), Some("Five"));
        assert_eq!(loader.describe(), "videos.json");
    }

    #[test]
    fn test_null_and_float_category_ids_load() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), VIDEOS_FILE, r#"[
            {"tags": ["a"], "target_category_id": null},
            {"tags": ["b"], "target_category_id": 9.0}
        ]"#);

        let videos = JsonDatasetLoader::new(tmp.path()).load_videos().unwrap();
        assert_eq!(videos[0].target_category_id, CategoryId::Null);
        assert_eq!(videos[1].target_category_id, CategoryId::Int(9));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let tmp    = tempfile::tempdir().unwrap();
        let loader = JsonDatasetLoader::new(tmp.path());
        let err    = loader.load_videos().unwrap_err();
        assert!(err.to_string().contains("videos.json"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), CATEGORIES_FILE, "{not json");
        let loader = JsonDatasetLoader::new(tmp.path());
        assert!(loader.load_categories().is_err());
    }
}
