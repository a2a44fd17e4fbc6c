//! Reusable operation templates and the built-in system set.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{OperationType, Parameters, TargetType};

/// A named default parameterization of an operation.
///
/// Templates with `is_system == true` ship with the library and cannot be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub op_type: OperationType,
    pub target_type: TargetType,
    pub parameters: Parameters,
    pub is_system: bool,
}

/// Caller-supplied shape of a new user template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub op_type: OperationType,
    pub target_type: TargetType,
    #[serde(default)]
    pub parameters: Parameters,
}

impl BulkOperationTemplate {
    /// Creates a non-system template with a fresh UUID.
    pub fn from_request(request: TemplateRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            description: request.description,
            op_type: request.op_type,
            target_type: request.target_type,
            parameters: request.parameters,
            is_system: false,
        }
    }

    /// Returns the template defaults with `overrides` applied key by key.
    #[must_use]
    pub fn merged_parameters(&self, overrides: &Parameters) -> Parameters {
        let mut merged = self.parameters.clone();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// The five templates every registry starts with.
    pub fn system_templates() -> Vec<Self> {
        vec![
            system(
                "move-to-bin",
                "Move to Bin",
                "Move selected items to a specific bin",
                OperationType::Move,
                json!({ "binId": "" }),
            ),
            system(
                "add-tags",
                "Add Tags",
                "Add tags to selected items",
                OperationType::Tag,
                json!({ "tagIds": [] }),
            ),
            system(
                "remove-tags",
                "Remove Tags",
                "Remove tags from selected items",
                OperationType::Untag,
                json!({ "tagIds": [] }),
            ),
            system(
                "delete-items",
                "Delete Items",
                "Permanently delete selected items",
                OperationType::Delete,
                json!({ "confirm": false }),
            ),
            system(
                "export-items",
                "Export Items",
                "Export selected items to file",
                OperationType::Export,
                json!({ "format": "json", "includeMetadata": true }),
            ),
        ]
    }
}

fn system(
    id: &str,
    name: &str,
    description: &str,
    op_type: OperationType,
    parameters: serde_json::Value,
) -> BulkOperationTemplate {
    BulkOperationTemplate {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        op_type,
        target_type: TargetType::Thoughtmarks,
        parameters: match parameters {
            serde_json::Value::Object(map) => map,
            _ => Parameters::new(),
        },
        is_system: true,
    }
}
