//! Core library for Thoughtmarks: bulk operations over thoughtmarks, tasks and bins.
//!
//! The primary entry point is [`BulkEngine`], which applies a single operation
//! (move, tag, untag, delete, export) across a list of item IDs, records a
//! result per item, and tracks progress and status as it goes. Items are
//! mutated through the [`ItemStore`] trait.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    engine::BulkEngine,
    error::{BulkError, Result},
    item::{Bin, Task, Thoughtmark, ThoughtmarkPatch},
    operation::{
        BulkOperation, BulkOperationResult, OperationRequest, OperationStatus, OperationSummary,
        OperationType, Parameters, TargetType, OPERATION_RESULT_ID,
    },
    plan::{DeleteTarget, ExportFormat, ExportOptions, OperationPlan},
    registry::OperationRegistry,
    selection::{BulkSelection, SelectionFilter},
    settings::{load_settings, save_settings, EngineSettings},
    storage::{CountTable, SqliteItemStore},
    store::{ItemStore, MemoryItemStore},
    template::{BulkOperationTemplate, TemplateRequest},
};
