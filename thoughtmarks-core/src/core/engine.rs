//! Bulk operation execution.
//!
//! [`BulkEngine`] owns an [`OperationRegistry`] and the [`ItemStore`] it
//! mutates, and drives each operation through its state machine:
//!
//! ```text
//! pending ──▶ running ──▶ completed
//!                    ├──▶ failed      (operation-level error, before any item)
//!                    └──▶ cancelled   (cancel_operation while running)
//! ```
//!
//! Items are processed one at a time in `item_ids` order. A failing item is
//! recorded in the results and the batch continues. Cancellation is checked
//! before every item, so a cancelled operation stops with partial results.
//!
//! The engine is `Sync`. The registry lock is released while an item is being
//! mutated, which lets another thread observe progress or cancel the
//! operation mid-run.
//!
//! ```rust
//! use serde_json::json;
//! use thoughtmarks_core::{
//!     BulkEngine, MemoryItemStore, OperationRequest, OperationStatus, OperationType,
//!     TargetType, Thoughtmark,
//! };
//!
//! let mut store = MemoryItemStore::new();
//! store.insert_thoughtmark(Thoughtmark::new("a", "Draft"));
//! let engine = BulkEngine::new(store);
//!
//! let op = engine.create_operation(
//!     OperationRequest::new(OperationType::Tag, TargetType::Thoughtmarks, ["a"])
//!         .with_parameter("tagIds", json!(["ideas"])),
//! );
//! let done = engine.execute_operation(&op.id).unwrap();
//!
//! assert_eq!(done.status, OperationStatus::Completed);
//! assert_eq!(done.progress, 100);
//! assert_eq!(engine.store().thoughtmarks[0].tags, vec!["ideas".to_string()]);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    BulkError, BulkOperation, BulkOperationResult, BulkOperationTemplate, BulkSelection,
    DeleteTarget, EngineSettings, ItemStore, OperationPlan, OperationRegistry, OperationRequest,
    OperationStatus, Parameters, Result, TemplateRequest, Thoughtmark, ThoughtmarkPatch,
    OPERATION_RESULT_ID,
};

/// Executes bulk operations against an [`ItemStore`].
pub struct BulkEngine<S: ItemStore> {
    registry: Mutex<OperationRegistry>,
    store: Mutex<S>,
}

impl<S: ItemStore> BulkEngine<S> {
    /// Creates an engine over `store` with default settings.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, &EngineSettings::default())
    }

    pub fn with_settings(store: S, settings: &EngineSettings) -> Self {
        Self {
            registry: Mutex::new(OperationRegistry::new(settings)),
            store: Mutex::new(store),
        }
    }

    /// Locks and returns the item store.
    ///
    /// Blocks while an operation is executing.
    pub fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_store(self) -> S {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry(&self) -> MutexGuard<'_, OperationRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_operation(&self, request: OperationRequest) -> BulkOperation {
        self.registry().create_operation(request)
    }

    /// Builds and records an operation from a template and a selection.
    ///
    /// The operation type comes from the template, the target collection and
    /// item IDs from `selection`, and the parameters are the template defaults
    /// overlaid with `overrides`. Returns `None` for an unknown template ID.
    pub fn create_operation_from_template(
        &self,
        template_id: &str,
        selection: &BulkSelection,
        overrides: &Parameters,
    ) -> Option<BulkOperation> {
        let mut registry = self.registry();
        let request = {
            let template = registry.template(template_id)?;
            OperationRequest {
                op_type: template.op_type.to_string(),
                target_type: selection.target_type.to_string(),
                item_ids: selection.item_ids.clone(),
                parameters: template.merged_parameters(overrides),
            }
        };
        Some(registry.create_operation(request))
    }

    /// Runs a pending operation to a terminal state and returns a snapshot of it.
    ///
    /// Per-item failures and operation-level failures are reported through the
    /// returned record's `status` and `results`, never as an `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::OperationNotFound`] if `id` is unknown, and
    /// [`BulkError::InvalidState`] if the operation is not pending (it is
    /// already running or has finished).
    pub fn execute_operation(&self, id: &str) -> Result<BulkOperation> {
        let (plan, item_ids) = {
            let mut registry = self.registry();
            let op = registry
                .operation_mut(id)
                .ok_or_else(|| BulkError::OperationNotFound(id.to_string()))?;
            if op.status != OperationStatus::Pending {
                return Err(BulkError::InvalidState(format!(
                    "Operation {id} is {}, only pending operations can be executed",
                    op.status
                )));
            }

            op.status = OperationStatus::Running;
            op.progress = 0;
            op.results.clear();
            op.touch();
            log::info!(
                "Bulk operation {id} started: {} on {} {}",
                op.op_type,
                op.item_ids.len(),
                op.target_type
            );

            match OperationPlan::resolve(op) {
                Ok(plan) => {
                    let item_ids = op.item_ids.clone();
                    registry.begin_execution(id);
                    (plan, item_ids)
                }
                Err(e) => {
                    log::warn!("Bulk operation {id} failed: {e}");
                    op.status = OperationStatus::Failed;
                    op.results
                        .push(BulkOperationResult::failed(OPERATION_RESULT_ID, e.to_string()));
                    op.touch();
                    let snapshot = op.clone();
                    registry.purge_if_needed();
                    return Ok(snapshot);
                }
            }
        };

        let mut store = self.store();
        for (index, item_id) in item_ids.iter().enumerate() {
            if self.is_cancelled(id) {
                break;
            }

            let result = match apply_to_item(&mut *store, &plan, item_id) {
                Ok(()) => {
                    log::debug!("Bulk operation {id}: item {item_id} done");
                    BulkOperationResult::succeeded(item_id.as_str())
                }
                Err(e) => {
                    log::warn!("Bulk operation {id}: item {item_id} failed: {e}");
                    BulkOperationResult::failed(item_id.as_str(), e.to_string())
                }
            };

            // The mutation has happened, so its result is recorded even if a
            // cancellation arrived while it was in flight.
            let mut registry = self.registry();
            let Some(op) = registry.operation_mut(id) else {
                break;
            };
            op.results.push(result);
            op.progress = op.running_progress(index + 1);
            op.touch();
        }
        drop(store);

        let mut registry = self.registry();
        registry.finish_execution(id);
        let op = registry
            .operation_mut(id)
            .ok_or_else(|| BulkError::OperationNotFound(id.to_string()))?;
        if op.status == OperationStatus::Running {
            op.status = OperationStatus::Completed;
            op.progress = 100;
            op.touch();
            let summary = op.summary();
            log::info!(
                "Bulk operation {id} completed: {} succeeded, {} failed",
                summary.succeeded,
                summary.failed
            );
        } else {
            log::info!(
                "Bulk operation {id} stopped as {} after {} of {} items",
                op.status,
                op.results.len(),
                op.item_ids.len()
            );
        }
        let snapshot = op.clone();
        registry.purge_if_needed();
        Ok(snapshot)
    }

    fn is_cancelled(&self, id: &str) -> bool {
        self.registry()
            .operation(id)
            .map_or(true, |op| op.status == OperationStatus::Cancelled)
    }

    /// Requests cancellation of a running operation.
    ///
    /// Returns `false` unless the operation exists and is running. The
    /// executing loop stops before its next item.
    pub fn cancel_operation(&self, id: &str) -> bool {
        self.registry().cancel_operation(id)
    }

    pub fn get_operations(&self) -> Vec<BulkOperation> {
        self.registry().operations().to_vec()
    }

    pub fn get_operation(&self, id: &str) -> Option<BulkOperation> {
        self.registry().operation(id).cloned()
    }

    pub fn get_templates(&self) -> Vec<BulkOperationTemplate> {
        self.registry().templates().to_vec()
    }

    pub fn create_template(&self, request: TemplateRequest) -> BulkOperationTemplate {
        self.registry().create_template(request)
    }

    /// Deletes a user template; system templates and unknown IDs return `false`.
    pub fn delete_template(&self, id: &str) -> bool {
        self.registry().delete_template(id)
    }
}

/// Looks up a thoughtmark for move/tag/untag.
///
/// An unknown ID is not an error: there is nothing to mutate, so the item is
/// skipped and counts as a success.
fn find_thoughtmark<S: ItemStore + ?Sized>(store: &S, id: &str) -> Result<Option<Thoughtmark>> {
    let found = store.thoughtmark(id)?;
    if found.is_none() {
        log::debug!("Thoughtmark {id} not found, nothing to update");
    }
    Ok(found)
}

/// Applies `plan` to a single item.
fn apply_to_item<S: ItemStore + ?Sized>(
    store: &mut S,
    plan: &OperationPlan,
    item_id: &str,
) -> Result<()> {
    match plan {
        OperationPlan::Move { bin_id } => {
            if find_thoughtmark(store, item_id)?.is_none() {
                return Ok(());
            }
            store.update_thoughtmark(
                item_id,
                ThoughtmarkPatch {
                    bin_id: Some(bin_id.clone()),
                    tags: None,
                },
            )
        }
        OperationPlan::Tag { tag_ids } => {
            let Some(Thoughtmark { tags: current, .. }) = find_thoughtmark(store, item_id)? else {
                return Ok(());
            };
            let mut tags: Vec<String> = Vec::with_capacity(current.len() + tag_ids.len());
            for tag in current.iter().chain(tag_ids) {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
            store.update_thoughtmark(
                item_id,
                ThoughtmarkPatch {
                    bin_id: None,
                    tags: Some(tags),
                },
            )
        }
        OperationPlan::Untag { tag_ids } => {
            let Some(Thoughtmark { mut tags, .. }) = find_thoughtmark(store, item_id)? else {
                return Ok(());
            };
            tags.retain(|tag| !tag_ids.contains(tag));
            store.update_thoughtmark(
                item_id,
                ThoughtmarkPatch {
                    bin_id: None,
                    tags: Some(tags),
                },
            )
        }
        OperationPlan::Delete(DeleteTarget::Thoughtmarks) => store.delete_thoughtmark(item_id),
        OperationPlan::Delete(DeleteTarget::Tasks) => store.delete_task(item_id),
        OperationPlan::Delete(DeleteTarget::Bins) => store.delete_bin(item_id),
        OperationPlan::Export { target, options } => store.export_item(*target, item_id, options),
        OperationPlan::Skip { op_type, target } => {
            log::debug!("Skipping {item_id}: {op_type} has no effect on {target}");
            Ok(())
        }
    }
}
