//! Bulk operation records and the closed vocabularies they are built from.
//!
//! A [`BulkOperation`] is created from an [`OperationRequest`] in the
//! [`OperationStatus::Pending`] state and driven to a terminal state by the
//! [`BulkEngine`](super::engine::BulkEngine).
//!
//! The record keeps `type`, `targetType` and `parameters` exactly as the
//! caller supplied them, because they arrive as data from the presentation
//! layer. They are resolved into a typed
//! [`OperationPlan`](super::plan::OperationPlan) only when execution starts.
//!
//! ## Serialization
//!
//! All records serialize in camelCase. The operation type field is named
//! `type`, and statuses and type names are lowercase strings:
//!
//! ```rust
//! use thoughtmarks_core::{OperationStatus, OperationType};
//!
//! assert_eq!(serde_json::to_string(&OperationType::Untag).unwrap(), r#""untag""#);
//! assert_eq!(serde_json::to_string(&OperationStatus::Cancelled).unwrap(), r#""cancelled""#);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BulkError, Result};

/// Open, operation-specific argument map (e.g. `binId`, `tagIds`).
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Synthetic item ID used for the single result recorded on an operation-level failure.
pub const OPERATION_RESULT_ID: &str = "operation";

/// The mutation a bulk operation applies to each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Move,
    Delete,
    Tag,
    Untag,
    Archive,
    Export,
    Merge,
    Duplicate,
}

impl OperationType {
    pub const ALL: [OperationType; 8] = [
        Self::Move,
        Self::Delete,
        Self::Tag,
        Self::Untag,
        Self::Archive,
        Self::Export,
        Self::Merge,
        Self::Duplicate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Tag => "tag",
            Self::Untag => "untag",
            Self::Archive => "archive",
            Self::Export => "export",
            Self::Merge => "merge",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = BulkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| BulkError::UnsupportedOperation(s.to_string()))
    }
}

/// The collection an operation's item IDs belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Thoughtmarks,
    Tasks,
    Bins,
    Tags,
}

impl TargetType {
    pub const ALL: [TargetType; 4] = [Self::Thoughtmarks, Self::Tasks, Self::Bins, Self::Tags];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thoughtmarks => "thoughtmarks",
            Self::Tasks => "tasks",
            Self::Bins => "bins",
            Self::Tags => "tags",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = BulkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| BulkError::UnsupportedTarget(s.to_string()))
    }
}

/// Lifecycle state of a [`BulkOperation`].
///
/// `Pending` and `Running` are the only non-terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl OperationStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Outcome of processing a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub item_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl BulkOperationResult {
    pub fn succeeded(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            success: true,
            error: None,
            details: None,
        }
    }

    pub fn failed(item_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            success: false,
            error: Some(error.into()),
            details: None,
        }
    }
}

/// Caller-supplied shape of a new operation.
///
/// `op_type` and `target_type` are free strings so that a value coming from the
/// presentation layer can always be recorded; they are validated when the
/// operation is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(rename = "type")]
    pub op_type: String,
    pub target_type: String,
    pub item_ids: Vec<String>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl OperationRequest {
    /// Builds a request from the typed vocabularies.
    pub fn new<I, S>(op_type: OperationType, target_type: TargetType, item_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op_type: op_type.to_string(),
            target_type: target_type.to_string(),
            item_ids: item_ids.into_iter().map(Into::into).collect(),
            parameters: Parameters::new(),
        }
    }

    /// Sets a single parameter, replacing any previous value for `key`.
    #[must_use]
    pub fn with_parameter(mut self, key: &str, value: serde_json::Value) -> Self {
        self.parameters.insert(key.to_string(), value);
        self
    }
}

/// A unit of bulk work and its progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperation {
    pub id: String,
    #[serde(rename = "type")]
    pub op_type: String,
    pub target_type: String,
    pub item_ids: Vec<String>,
    pub parameters: Parameters,
    pub status: OperationStatus,
    /// Integer percentage in `0..=100`; exactly 100 only once `Completed`.
    pub progress: u8,
    pub results: Vec<BulkOperationResult>,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
    /// Unix timestamp in milliseconds, refreshed on every status or progress change.
    pub updated_at: i64,
}

impl BulkOperation {
    /// Creates a pending record with a fresh UUID and no results.
    pub fn from_request(request: OperationRequest) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            op_type: request.op_type,
            target_type: request.target_type,
            item_ids: request.item_ids,
            parameters: request.parameters,
            status: OperationStatus::Pending,
            progress: 0,
            results: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    /// Progress after `processed` items, held below 100 until completion.
    #[must_use]
    pub fn running_progress(&self, processed: usize) -> u8 {
        let total = self.item_ids.len();
        if total == 0 {
            return 0;
        }
        let percent = (processed * 100 + total / 2) / total;
        percent.min(99) as u8
    }

    /// Entries that recorded an error, in processing order.
    pub fn failed_results(&self) -> impl Iterator<Item = &BulkOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }

    #[must_use]
    pub fn summary(&self) -> OperationSummary {
        let succeeded = self.results.iter().filter(|r| r.success).count();
        OperationSummary {
            total: self.item_ids.len(),
            processed: self.results.len(),
            succeeded,
            failed: self.results.len() - succeeded,
        }
    }
}

/// Aggregate counts over a [`BulkOperation`]'s results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}
