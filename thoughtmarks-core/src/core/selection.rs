//! Caller-side grouping of items chosen for a bulk operation.

use serde::{Deserialize, Serialize};

use crate::TargetType;

/// Optional criteria the caller used to build a selection.
///
/// Carried for display and re-selection only; the engine never evaluates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionFilter {
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub bin_id: Option<String>,
    pub search: Option<String>,
}

/// A target collection plus the item IDs chosen from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSelection {
    pub target_type: TargetType,
    pub item_ids: Vec<String>,
    #[serde(default)]
    pub filters: Option<SelectionFilter>,
}

impl BulkSelection {
    pub fn new(target_type: TargetType) -> Self {
        Self {
            target_type,
            item_ids: Vec::new(),
            filters: None,
        }
    }

    pub fn with_items<I, S>(target_type: TargetType, item_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_type,
            item_ids: item_ids.into_iter().map(Into::into).collect(),
            filters: None,
        }
    }

    /// Adds `item_id` if absent, removes it otherwise. Returns `true` if now selected.
    pub fn toggle(&mut self, item_id: &str) -> bool {
        if let Some(index) = self.item_ids.iter().position(|id| id == item_id) {
            self.item_ids.remove(index);
            false
        } else {
            self.item_ids.push(item_id.to_string());
            true
        }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.item_ids.iter().any(|id| id == item_id)
    }

    pub fn clear(&mut self) {
        self.item_ids.clear();
    }

    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_keeps_insertion_order() {
        let mut sel = BulkSelection::new(TargetType::Thoughtmarks);
        assert!(sel.toggle("c"));
        assert!(sel.toggle("a"));
        assert!(sel.toggle("b"));
        assert!(!sel.toggle("a"));

        assert_eq!(sel.item_ids, vec!["c".to_string(), "b".to_string()]);
        assert!(sel.contains("b"));
        assert!(!sel.contains("a"));
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut sel = BulkSelection::with_items(TargetType::Tasks, ["t1", "t2"]);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.target_type, TargetType::Tasks);
    }

    #[test]
    fn test_deserializes_without_filters() {
        let sel: BulkSelection =
            serde_json::from_str(r#"{"targetType":"bins","itemIds":["b1"]}"#).unwrap();
        assert_eq!(sel.target_type, TargetType::Bins);
        assert!(sel.filters.is_none());
    }
}
