//! Internal domain modules for the Thoughtmarks core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod engine;
pub mod error;
pub mod item;
pub mod operation;
pub mod plan;
pub mod registry;
pub mod selection;
pub mod settings;
pub mod storage;
pub mod store;
pub mod template;

#[doc(inline)]
pub use engine::BulkEngine;
#[doc(inline)]
pub use error::{BulkError, Result};
#[doc(inline)]
pub use item::{Bin, Task, Thoughtmark, ThoughtmarkPatch};
#[doc(inline)]
pub use operation::{
    BulkOperation, BulkOperationResult, OperationRequest, OperationStatus, OperationSummary,
    OperationType, Parameters, TargetType,
};
#[doc(inline)]
pub use plan::{ExportOptions, OperationPlan};
#[doc(inline)]
pub use registry::OperationRegistry;
#[doc(inline)]
pub use selection::BulkSelection;
#[doc(inline)]
pub use settings::EngineSettings;
#[doc(inline)]
pub use storage::SqliteItemStore;
#[doc(inline)]
pub use store::{ItemStore, MemoryItemStore};
#[doc(inline)]
pub use template::BulkOperationTemplate;
