// ============================================================
// Layer 3 — Video and Category Domain Types
// ============================================================
// A Video carries the tags we vectorise and the id of the
// category it should be classified into. A Category is only
// ever referenced by id; its remaining fields are kept so
// they can be printed, but nothing reads them.
//
// Example records:
//   {"tags": ["drama", "1990s"], "target_category_id": 9}
//   {"id": 9, "title": "Movies"}
//
// Reference: Rust Book §5 (Structs and Methods)
//            serde documentation (custom Deserialize, flatten)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Category identifier as it appears in the JSON files.
///
/// Integer and string ids are kept distinct: `9` and `"9"` are
/// different categories, so a video pointing at `"9"` does not
/// match a category declared with `9`. An integral float such as
/// `9.0` is the integer `9`. `null` and any other JSON value are
/// kept as ids too; they only match an identical id, and a video
/// whose id matches no category trains with an all-zero target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryId {
    Int(i64),
    Text(String),
    Null,
    /// Compact JSON text of a value that is none of the above
    Other(String),
}

impl From<serde_json::Value> for CategoryId {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null      => CategoryId::Null,
            Value::String(s) => CategoryId::Text(s),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return CategoryId::Int(i);
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                        CategoryId::Int(f as i64)
                    }
                    _ => CategoryId::Other(n.to_string()),
                }
            }
            other => CategoryId::Other(other.to_string()),
        }
    }
}

impl Serialize for CategoryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CategoryId::Int(id)    => serializer.serialize_i64(*id),
            CategoryId::Text(id)   => serializer.serialize_str(id),
            CategoryId::Null       => serializer.serialize_unit(),
            CategoryId::Other(raw) => serde_json::from_str::<serde_json::Value>(raw)
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CategoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(CategoryId::from)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryId::Int(id)    => write!(f, "{id}"),
            CategoryId::Text(id)   => write!(f, "{id}"),
            CategoryId::Null       => f.write_str("null"),
            CategoryId::Other(raw) => f.write_str(raw),
        }
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        CategoryId::Int(id)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        CategoryId::Text(id.to_string())
    }
}

/// A single video record. Read-only once loaded.
/// Unknown JSON fields (title, channel, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Tag strings attached to the video; duplicates are allowed
    pub tags: Vec<String>,

    /// The category this video is labelled with
    pub target_category_id: CategoryId,
}

impl Video {
    pub fn new<T: Into<String>>(
        tags:               impl IntoIterator<Item = T>,
        target_category_id: impl Into<CategoryId>,
    ) -> Self {
        Self {
            tags:               tags.into_iter().map(Into::into).collect(),
            target_category_id: target_category_id.into(),
        }
    }
}

/// A category record. Only `id` takes part in training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    /// Descriptive fields (title, assignable, ...) kept verbatim
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>) -> Self {
        Self { id: id.into(), details: serde_json::Map::new() }
    }

    /// The `title` field if the record has one, for display
    pub fn title(&self) -> Option<&str> {
        self.details.get("title").and_then(|v| v.as_str())
    }
}
