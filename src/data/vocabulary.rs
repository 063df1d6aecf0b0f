// ============================================================
// Layer 4 — Vocabulary and Index Maps
// ============================================================
// Two run-scoped lookup tables, built once and then only read:
//
//   TagIndex      — tag string  → position in the input vector
//   CategoryIndex — category id → position in the target vector
//
// Both are immutable values handed to the vectoriser, never
// global state. Tags are numbered in first-seen order, so the
// numbering is stable for a fixed input order but changes if
// the videos are reordered.
//
// The Vocabulary struct is the on-disk form of both tables,
// saved next to the model so predictions can be decoded.
//
// Reference: Rust Book §8 (Hash Maps)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::video::{Category, CategoryId, Video};

// ─── TagIndex ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags:  Vec<String>,
    index: HashMap<String, usize>,
}

impl TagIndex {
    /// Collect every distinct tag across all videos.
    pub fn from_videos(videos: &[Video]) -> Self {
        Self::from_tags(videos.iter().flat_map(|v| v.tags.iter().cloned()))
    }

    /// Build from tags already in index order; repeats keep their first slot.
    pub fn from_tags(tags: impl IntoIterator<Item = String>) -> Self {
        let mut out = Self::default();
        for tag in tags {
            if !out.index.contains_key(&tag) {
                out.index.insert(tag.clone(), out.tags.len());
                out.tags.push(tag);
            }
        }
        out
    }

    pub fn get(&self, tag: &str) -> Option<usize> {
        self.index.get(tag).copied()
    }

    /// Vocabulary size
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in index order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

// ─── CategoryIndex ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    ids:   Vec<CategoryId>,
    index: HashMap<CategoryId, usize>,
}

impl CategoryIndex {
    pub fn from_categories(categories: &[Category]) -> Self {
        Self::from_ids(categories.iter().map(|c| c.id.clone()))
    }

    /// One slot per record. A repeated id points at its last slot,
    /// and the earlier slot can never be a target.
    pub fn from_ids(ids: impl IntoIterator<Item = CategoryId>) -> Self {
        let ids: Vec<CategoryId> = ids.into_iter().collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self { ids, index }
    }

    pub fn get(&self, id: &CategoryId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Category count (number of records, not distinct ids)
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The category id occupying `index` in the target vector
    pub fn id_at(&self, index: usize) -> Option<&CategoryId> {
        self.ids.get(index)
    }

    pub fn ids(&self) -> &[CategoryId] {
        &self.ids
    }
}

// ─── Vocabulary ───────────────────────────────────────────────────────────────
/// Serialised form of both index maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub tags:         Vec<String>,
    pub category_ids: Vec<CategoryId>,
}

impl Vocabulary {
    pub fn new(tags: &TagIndex, categories: &CategoryIndex) -> Self {
        Self {
            tags:         tags.tags().to_vec(),
            category_ids: categories.ids().to_vec(),
        }
    }

    pub fn tag_index(&self) -> TagIndex {
        TagIndex::from_tags(self.tags.iter().cloned())
    }

    pub fn category_index(&self) -> CategoryIndex {
        CategoryIndex::from_ids(self.category_ids.iter().cloned())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_numbered_in_first_seen_order() {
        let videos = vec![
            Video::new(["drama", "comedy"], 1),
            Video::new(["comedy", "news", "drama"], 1),
        ];
        let idx = TagIndex::from_videos(&videos);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.get("drama"),  Some(0));
        assert_eq!(idx.get("comedy"), Some(1));
        assert_eq!(idx.get("news"),   Some(2));
        assert_eq!(idx.get("sport"),  None);
    }

    #[test]
    fn test_tag_index_is_stable_for_same_input() {
        let videos = vec![Video::new(["b", "a"], 1), Video::new(["c"], 2)];
        let first  = TagIndex::from_videos(&videos);
        let second = TagIndex::from_videos(&videos);
        assert_eq!(first.tags(), second.tags());
    }

    #[test]
    fn test_category_index_follows_list_order() {
        let cats = vec![Category::new(5), Category::new(9)];
        let idx  = CategoryIndex::from_categories(&cats);
        assert_eq!(idx.get(&CategoryId::Int(5)), Some(0));
        assert_eq!(idx.get(&CategoryId::Int(9)), Some(1));
        assert_eq!(idx.id_at(1), Some(&CategoryId::Int(9)));
        assert_eq!(idx.get(&CategoryId::Int(7)), None);
    }

    #[test]
    fn test_repeated_category_id_keeps_count_and_last_slot() {
        let cats = vec![Category::new(5), Category::new(9), Category::new(5)];
        let idx  = CategoryIndex::from_categories(&cats);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.get(&CategoryId::Int(5)), Some(2));
    }

    #[test]
    fn test_vocabulary_rebuilds_same_indexes() {
        let tags  = TagIndex::from_tags(["x".to_string(), "y".to_string()]);
        let cats  = CategoryIndex::from_ids([CategoryId::from("a"), CategoryId::Int(3)]);
        let vocab = Vocabulary::new(&tags, &cats);

        let json: Vocabulary = serde_json::from_str(&serde_json::to_string(&vocab).unwrap()).unwrap();
        assert_eq!(json.tag_index().get("y"), Some(1));
        assert_eq!(json.category_index().get(&CategoryId::Int(3)), Some(1));
    }
}
