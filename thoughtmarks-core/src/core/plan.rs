//! Typed execution plans resolved from a [`BulkOperation`]'s open parameters.
//!
//! Every dispatch branch in the engine receives exactly the arguments it
//! needs: an [`OperationPlan`] can only be built if the operation type has a
//! handler, the target collection is known and the required parameters are
//! present. Anything that does not resolve is an operation-level failure,
//! reported before the first item is touched. A known type aimed at a
//! collection it does not act on resolves to [`OperationPlan::Skip`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BulkError, BulkOperation, OperationType, Parameters, Result, TargetType};

/// File format requested by an `export` operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Markdown,
}

/// Options handed to [`ItemStore::export_item`](super::store::ItemStore::export_item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub include_metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            include_metadata: true,
        }
    }
}

/// Collections that support deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Thoughtmarks,
    Tasks,
    Bins,
}

/// The fully-typed effect of an operation on each of its items.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationPlan {
    /// Set each thoughtmark's bin.
    Move { bin_id: String },
    /// Union each thoughtmark's tags with `tag_ids`.
    Tag { tag_ids: Vec<String> },
    /// Remove `tag_ids` from each thoughtmark's tags.
    Untag { tag_ids: Vec<String> },
    Delete(DeleteTarget),
    Export {
        target: TargetType,
        options: ExportOptions,
    },
    /// The type has no effect on this target; each item succeeds untouched.
    Skip {
        op_type: OperationType,
        target: TargetType,
    },
}

impl OperationPlan {
    /// Resolves `op` into a plan.
    ///
    /// `move`, `tag` and `untag` only act on thoughtmarks and `delete` has no
    /// effect on tags; those combinations resolve to [`OperationPlan::Skip`].
    ///
    /// # Errors
    ///
    /// - [`BulkError::UnsupportedOperation`] for an unknown type string or a
    ///   type with no handler (`archive`, `merge`, `duplicate`).
    /// - [`BulkError::UnsupportedTarget`] for an unknown target string.
    /// - [`BulkError::InvalidParameter`] when a required parameter is missing or mistyped.
    pub fn resolve(op: &BulkOperation) -> Result<Self> {
        let op_type: OperationType = op.op_type.parse()?;
        let target: TargetType = op.target_type.parse()?;
        let params = &op.parameters;

        let skip = Self::Skip { op_type, target };

        match op_type {
            OperationType::Move | OperationType::Tag | OperationType::Untag
                if target != TargetType::Thoughtmarks =>
            {
                Ok(skip)
            }
            OperationType::Move => Ok(Self::Move {
                bin_id: string_param(params, op_type, "binId")?,
            }),
            OperationType::Tag => Ok(Self::Tag {
                tag_ids: string_list_param(params, op_type, "tagIds")?,
            }),
            OperationType::Untag => Ok(Self::Untag {
                tag_ids: string_list_param(params, op_type, "tagIds")?,
            }),
            OperationType::Delete => {
                let delete_target = match target {
                    TargetType::Thoughtmarks => DeleteTarget::Thoughtmarks,
                    TargetType::Tasks => DeleteTarget::Tasks,
                    TargetType::Bins => DeleteTarget::Bins,
                    TargetType::Tags => return Ok(skip),
                };
                Ok(Self::Delete(delete_target))
            }
            OperationType::Export => Ok(Self::Export {
                target,
                options: export_options(params)?,
            }),
            OperationType::Archive | OperationType::Merge | OperationType::Duplicate => {
                Err(BulkError::UnsupportedOperation(op_type.to_string()))
            }
        }
    }
}

fn invalid(op: OperationType, name: &'static str, reason: impl Into<String>) -> BulkError {
    BulkError::InvalidParameter {
        op: op.to_string(),
        name,
        reason: reason.into(),
    }
}

fn string_param(params: &Parameters, op: OperationType, name: &'static str) -> Result<String> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(invalid(op, name, format!("expected a string, got {other}"))),
        None => Err(invalid(op, name, "missing")),
    }
}

fn string_list_param(
    params: &Parameters,
    op: OperationType,
    name: &'static str,
) -> Result<Vec<String>> {
    let values = match params.get(name) {
        Some(Value::Array(values)) => values,
        Some(other) => return Err(invalid(op, name, format!("expected an array, got {other}"))),
        None => return Err(invalid(op, name, "missing")),
    };
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(invalid(op, name, format!("expected string entries, got {other}"))),
        })
        .collect()
}

fn export_options(params: &Parameters) -> Result<ExportOptions> {
    let mut options = ExportOptions::default();
    if let Some(format) = params.get("format") {
        options.format = serde_json::from_value(format.clone()).map_err(|e| {
            invalid(OperationType::Export, "format", e.to_string())
        })?;
    }
    match params.get("includeMetadata") {
        Some(Value::Bool(b)) => options.include_metadata = *b,
        Some(other) => {
            return Err(invalid(
                OperationType::Export,
                "includeMetadata",
                format!("expected a boolean, got {other}"),
            ))
        }
        None => {}
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OperationRequest;
    use serde_json::json;

    fn op(op_type: &str, target: &str, parameters: Value) -> BulkOperation {
        BulkOperation::from_request(OperationRequest {
            op_type: op_type.to_string(),
            target_type: target.to_string(),
            item_ids: vec!["a".to_string()],
            parameters: parameters.as_object().cloned().unwrap_or_default(),
        })
    }

    #[test]
    fn test_resolve_move() {
        let plan = OperationPlan::resolve(&op("move", "thoughtmarks", json!({"binId": "b1"}))).unwrap();
        assert_eq!(plan, OperationPlan::Move { bin_id: "b1".to_string() });
    }

    #[test]
    fn test_resolve_tag_reads_tag_ids() {
        let plan =
            OperationPlan::resolve(&op("tag", "thoughtmarks", json!({"tagIds": ["x", "y"]}))).unwrap();
        assert_eq!(
            plan,
            OperationPlan::Tag {
                tag_ids: vec!["x".to_string(), "y".to_string()]
            }
        );
    }

    #[test]
    fn test_resolve_unknown_type() {
        let err = OperationPlan::resolve(&op("bogus", "thoughtmarks", json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operation type: bogus");
    }

    #[test]
    fn test_resolve_types_without_handler() {
        for name in ["archive", "merge", "duplicate"] {
            let err = OperationPlan::resolve(&op(name, "thoughtmarks", json!({}))).unwrap_err();
            assert_eq!(err.to_string(), format!("Unsupported operation type: {name}"));
        }
    }

    #[test]
    fn test_resolve_thoughtmark_only_types_skip_other_targets() {
        let plan = OperationPlan::resolve(&op("move", "tasks", json!({"binId": "b1"}))).unwrap();
        assert_eq!(
            plan,
            OperationPlan::Skip {
                op_type: OperationType::Move,
                target: TargetType::Tasks,
            }
        );

        // Parameters are not read for a skipped combination.
        let plan = OperationPlan::resolve(&op("untag", "bins", json!({}))).unwrap();
        assert!(matches!(plan, OperationPlan::Skip { .. }));
    }

    #[test]
    fn test_resolve_delete_on_tags_skips() {
        let plan = OperationPlan::resolve(&op("delete", "tags", json!({}))).unwrap();
        assert_eq!(
            plan,
            OperationPlan::Skip {
                op_type: OperationType::Delete,
                target: TargetType::Tags,
            }
        );
    }

    #[test]
    fn test_resolve_delete_ignores_confirm() {
        let plan = OperationPlan::resolve(&op("delete", "bins", json!({"confirm": false}))).unwrap();
        assert_eq!(plan, OperationPlan::Delete(DeleteTarget::Bins));
    }

    #[test]
    fn test_resolve_missing_and_mistyped_parameters() {
        let err = OperationPlan::resolve(&op("move", "thoughtmarks", json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter binId for move: missing");

        let err = OperationPlan::resolve(&op("untag", "thoughtmarks", json!({"tagIds": "x"}))).unwrap_err();
        assert!(matches!(err, BulkError::InvalidParameter { name: "tagIds", .. }));

        let err = OperationPlan::resolve(&op("tag", "thoughtmarks", json!({"tagIds": [1]}))).unwrap_err();
        assert!(matches!(err, BulkError::InvalidParameter { name: "tagIds", .. }));
    }

    #[test]
    fn test_resolve_export_defaults_and_overrides() {
        let plan = OperationPlan::resolve(&op("export", "tasks", json!({}))).unwrap();
        assert_eq!(
            plan,
            OperationPlan::Export {
                target: TargetType::Tasks,
                options: ExportOptions::default(),
            }
        );

        let plan = OperationPlan::resolve(&op(
            "export",
            "thoughtmarks",
            json!({"format": "csv", "includeMetadata": false}),
        ))
        .unwrap();
        assert_eq!(
            plan,
            OperationPlan::Export {
                target: TargetType::Thoughtmarks,
                options: ExportOptions {
                    format: ExportFormat::Csv,
                    include_metadata: false,
                },
            }
        );

        let err = OperationPlan::resolve(&op("export", "thoughtmarks", json!({"format": "pdf"}))).unwrap_err();
        assert!(matches!(err, BulkError::InvalidParameter { name: "format", .. }));
    }
}
