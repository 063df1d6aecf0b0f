// ============================================================
// Layer 4 — pandas-split Frames
// ============================================================
// The inference endpoint and the `predict` command both take
// a frame in pandas "split" orientation:
//
//   {
//     "columns": ["drama", "comedy", ...],
//     "index":   [0, 1],
//     "data":    [[0, 1, ...], [1, 0, ...]]
//   }
//
// Each row of `data` is one input vector. `columns` and
// `index` are carried along but not interpreted.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitFrame {
    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<serde_json::Value>>,

    pub data: Vec<Vec<f32>>,
}

impl SplitFrame {
    /// Check every row has exactly `width` values.
    pub fn validate_width(&self, width: usize) -> Result<()> {
        for (i, row) in self.data.iter().enumerate() {
            ensure!(
                row.len() == width,
                "row {} has {} values but the model expects {}",
                i,
                row.len(),
                width
            );
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_split_orientation() {
        let json  = r#"{"columns": ["a", "b"], "index": [0], "data": [[0, 1]]}"#;
        let frame: SplitFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.columns, vec!["a", "b"]);
        assert_eq!(frame.data, vec![vec![0.0, 1.0]]);
        assert!(frame.validate_width(2).is_ok());
    }

    #[test]
    fn test_columns_and_index_are_optional() {
        let frame: SplitFrame = serde_json::from_str(r#"{"data": [[1.0]]}"#).unwrap();
        assert!(frame.columns.is_empty());
        assert!(frame.index.is_none());
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let frame: SplitFrame = serde_json::from_str(r#"{"data": [[1, 0], [1]]}"#).unwrap();
        let err   = frame.validate_width(2).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
