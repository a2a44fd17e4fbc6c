//! In-memory registry of bulk operations and templates.

use std::collections::HashSet;

use crate::{
    BulkOperation, BulkOperationTemplate, EngineSettings, OperationRequest, OperationStatus,
    TemplateRequest,
};

/// Holds every known [`BulkOperation`] and [`BulkOperationTemplate`].
///
/// The registry performs no I/O. Operations are kept in creation order;
/// terminal operations beyond the configured retention are purged oldest-first
/// by [`purge_if_needed`](Self::purge_if_needed). An operation whose
/// execution loop has not returned yet is never purged, even after it was
/// cancelled.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    operations: Vec<BulkOperation>,
    templates: Vec<BulkOperationTemplate>,
    keep_last: Option<usize>,
    executing: HashSet<String>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

impl OperationRegistry {
    /// Creates a registry seeded with the system templates.
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            operations: Vec::new(),
            templates: BulkOperationTemplate::system_templates(),
            keep_last: settings.keep_last_operations,
            executing: HashSet::new(),
        }
    }

    /// Records a new pending operation and returns a copy of it.
    pub fn create_operation(&mut self, request: OperationRequest) -> BulkOperation {
        let operation = BulkOperation::from_request(request);
        log::debug!(
            "Created bulk operation {} ({} on {} items of {})",
            operation.id,
            operation.op_type,
            operation.item_ids.len(),
            operation.target_type
        );
        self.operations.push(operation.clone());
        operation
    }

    pub fn operations(&self) -> &[BulkOperation] {
        &self.operations
    }

    pub fn operation(&self, id: &str) -> Option<&BulkOperation> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn operation_mut(&mut self, id: &str) -> Option<&mut BulkOperation> {
        self.operations.iter_mut().find(|op| op.id == id)
    }

    /// Marks a running operation as cancelled.
    ///
    /// Returns `false` if the operation does not exist or is not running.
    pub fn cancel_operation(&mut self, id: &str) -> bool {
        match self.operation_mut(id) {
            Some(op) if op.status == OperationStatus::Running => {
                op.status = OperationStatus::Cancelled;
                op.touch();
                log::info!("Bulk operation {id} cancelled");
                true
            }
            _ => false,
        }
    }

    /// Marks `id` as being executed, which exempts it from purging.
    pub fn begin_execution(&mut self, id: &str) {
        self.executing.insert(id.to_string());
    }

    pub fn finish_execution(&mut self, id: &str) {
        self.executing.remove(id);
    }

    pub fn is_executing(&self, id: &str) -> bool {
        self.executing.contains(id)
    }

    fn is_purgeable(&self, op: &BulkOperation) -> bool {
        op.status.is_terminal() && !self.executing.contains(&op.id)
    }

    /// Removes the oldest terminal operations beyond the retention limit.
    ///
    /// Operations still being executed are skipped. Returns the number of
    /// operations removed.
    pub fn purge_if_needed(&mut self) -> usize {
        let Some(keep_last) = self.keep_last else {
            return 0;
        };
        let purgeable = self
            .operations
            .iter()
            .filter(|op| self.is_purgeable(op))
            .count();
        let mut excess = purgeable.saturating_sub(keep_last);
        if excess == 0 {
            return 0;
        }

        let removed = excess;
        let executing = &self.executing;
        self.operations.retain(|op| {
            if excess > 0 && op.status.is_terminal() && !executing.contains(&op.id) {
                excess -= 1;
                false
            } else {
                true
            }
        });
        log::debug!("Purged {removed} finished bulk operations");
        removed
    }

    pub fn templates(&self) -> &[BulkOperationTemplate] {
        &self.templates
    }

    pub fn template(&self, id: &str) -> Option<&BulkOperationTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Appends a new user template and returns a copy of it.
    pub fn create_template(&mut self, request: TemplateRequest) -> BulkOperationTemplate {
        let template = BulkOperationTemplate::from_request(request);
        self.templates.push(template.clone());
        template
    }

    /// Deletes a user template.
    ///
    /// Returns `false` if the template does not exist or is a system template.
    pub fn delete_template(&mut self, id: &str) -> bool {
        match self.templates.iter().position(|t| t.id == id) {
            Some(index) if !self.templates[index].is_system => {
                self.templates.remove(index);
                true
            }
            _ => false,
        }
    }
}
