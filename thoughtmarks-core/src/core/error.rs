//! Error types for the Thoughtmarks core library.

use thiserror::Error;

/// All errors that can occur within the Thoughtmarks core library.
#[derive(Debug, Error)]
pub enum BulkError {
    /// An operation ID was requested that is not held by the registry.
    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    /// A template ID was requested that is not held by the registry.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// An item addressed by a bulk operation does not exist in the item store.
    #[error("{kind} not found: {id}")]
    ItemNotFound {
        /// Human-readable item kind (`"Thoughtmark"`, `"Task"`, `"Bin"`).
        kind: &'static str,
        /// The missing item's ID.
        id: String,
    },

    /// The operation is not in a state that allows the requested transition.
    #[error("Invalid operation state: {0}")]
    InvalidState(String),

    /// The operation type string has no handler.
    #[error("Unsupported operation type: {0}")]
    UnsupportedOperation(String),

    /// The target collection string is unknown.
    #[error("Unsupported target type: {0}")]
    UnsupportedTarget(String),

    /// A required operation parameter is missing or has the wrong shape.
    #[error("Invalid parameter {name} for {op}: {reason}")]
    InvalidParameter {
        /// Operation type being resolved.
        op: String,
        /// Parameter key, e.g. `binId`.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The external item store rejected a mutation.
    #[error("Store error: {0}")]
    Store(String),

    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored item data or settings could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias that pins the error type to [`BulkError`].
pub type Result<T> = std::result::Result<T, BulkError>;

impl BulkError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::OperationNotFound(_) => "Bulk operation no longer exists".to_string(),
            Self::TemplateNotFound(_) => "Template no longer exists".to_string(),
            Self::ItemNotFound { kind, .. } => format!("{kind} no longer exists"),
            Self::InvalidState(msg) => msg.clone(),
            Self::UnsupportedOperation(op) => format!("This action is not available: {op}"),
            Self::UnsupportedTarget(target) => format!("Unknown collection: {target}"),
            Self::InvalidParameter { name, .. } => format!("Missing or invalid option: {name}"),
            Self::Store(e) => format!("Failed to save: {e}"),
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::Io(e) => format!("File error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operation_message() {
        let e = BulkError::UnsupportedOperation("bogus".to_string());
        assert_eq!(e.to_string(), "Unsupported operation type: bogus");
    }

    #[test]
    fn test_unsupported_target_message() {
        let e = BulkError::UnsupportedTarget("notes".to_string());
        assert_eq!(e.to_string(), "Unsupported target type: notes");
        assert_eq!(e.user_message(), "Unknown collection: notes");
    }

    #[test]
    fn test_item_not_found_message() {
        let e = BulkError::ItemNotFound {
            kind: "Thoughtmark",
            id: "tm-1".to_string(),
        };
        assert_eq!(e.to_string(), "Thoughtmark not found: tm-1");
        assert_eq!(e.user_message(), "Thoughtmark no longer exists");
    }
}
