//! Items held by the external data store and mutated by bulk operations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thoughtmark {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub bin_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Thoughtmark {
    /// Creates a thoughtmark with no tags, no bin and both timestamps set to now.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            bin_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style helper used by seeding code and tests.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Applies the set fields of `patch` and refreshes `updated_at`.
    pub fn apply(&mut self, patch: ThoughtmarkPatch) {
        if let Some(bin_id) = patch.bin_id {
            self.bin_id = Some(bin_id);
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Partial update passed to [`ItemStore::update_thoughtmark`](super::store::ItemStore::update_thoughtmark).
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtmarkPatch {
    pub bin_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thoughtmark_is_untagged() {
        let tm = Thoughtmark::new("tm-1", "Groceries");
        assert_eq!(tm.title, "Groceries");
        assert!(tm.tags.is_empty());
        assert!(tm.bin_id.is_none());
    }

    #[test]
    fn test_apply_patch_only_touches_set_fields() {
        let mut tm = Thoughtmark::new("tm-1", "Groceries").with_tags(["food"]);
        tm.apply(ThoughtmarkPatch {
            bin_id: Some("bin-7".to_string()),
            tags: None,
        });

        assert_eq!(tm.bin_id.as_deref(), Some("bin-7"));
        assert_eq!(tm.tags, vec!["food".to_string()]);
    }

    #[test]
    fn test_thoughtmark_serializes_camel_case() {
        let tm = Thoughtmark::new("tm-1", "Groceries");
        let json = serde_json::to_string(&tm).unwrap();
        assert!(json.contains("\"binId\":null"));
        assert!(json.contains("\"createdAt\""));
    }
}
