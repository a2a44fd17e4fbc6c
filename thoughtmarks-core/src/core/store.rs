//! The data store bulk operations mutate.
//!
//! [`ItemStore`] is the seam between the engine and whatever holds the user's
//! thoughtmarks, tasks and bins. Two implementations ship with the crate:
//! [`MemoryItemStore`] and the SQLite-backed
//! [`SqliteItemStore`](super::storage::SqliteItemStore).

use crate::{
    Bin, BulkError, ExportOptions, Result, TargetType, Task, Thoughtmark, ThoughtmarkPatch,
};

/// Mutations the engine performs on behalf of a bulk operation.
///
/// Every method reports failure through its `Result`; the engine records the
/// error message against the item being processed and moves on.
pub trait ItemStore {
    /// Looks up a thoughtmark; `Ok(None)` if it does not exist.
    fn thoughtmark(&self, id: &str) -> Result<Option<Thoughtmark>>;

    fn update_thoughtmark(&mut self, id: &str, patch: ThoughtmarkPatch) -> Result<()>;

    fn delete_thoughtmark(&mut self, id: &str) -> Result<()>;

    fn delete_task(&mut self, id: &str) -> Result<()>;

    fn delete_bin(&mut self, id: &str) -> Result<()>;

    /// Exports a single item.
    ///
    /// The default only records the request in the log; stores that can
    /// write files override it.
    fn export_item(&mut self, target: TargetType, id: &str, options: &ExportOptions) -> Result<()> {
        log::info!(
            "Exporting {target} item {id} as {:?} (metadata: {})",
            options.format,
            options.include_metadata
        );
        Ok(())
    }
}

/// An [`ItemStore`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryItemStore {
    pub thoughtmarks: Vec<Thoughtmark>,
    pub tasks: Vec<Task>,
    pub bins: Vec<Bin>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_thoughtmark(&mut self, thoughtmark: Thoughtmark) {
        self.thoughtmarks.push(thoughtmark);
    }

    pub fn insert_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn insert_bin(&mut self, bin: Bin) {
        self.bins.push(bin);
    }
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    kind: &'static str,
    key: impl Fn(&T) -> &str,
) -> Result<()> {
    let index = items
        .iter()
        .position(|item| key(item) == id)
        .ok_or_else(|| BulkError::ItemNotFound {
            kind,
            id: id.to_string(),
        })?;
    items.remove(index);
    Ok(())
}

impl ItemStore for MemoryItemStore {
    fn thoughtmark(&self, id: &str) -> Result<Option<Thoughtmark>> {
        Ok(self.thoughtmarks.iter().find(|t| t.id == id).cloned())
    }

    fn update_thoughtmark(&mut self, id: &str, patch: ThoughtmarkPatch) -> Result<()> {
        let thoughtmark = self
            .thoughtmarks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| BulkError::ItemNotFound {
                kind: "Thoughtmark",
                id: id.to_string(),
            })?;
        thoughtmark.apply(patch);
        Ok(())
    }

    fn delete_thoughtmark(&mut self, id: &str) -> Result<()> {
        remove_by_id(&mut self.thoughtmarks, id, "Thoughtmark", |t| t.id.as_str())
    }

    fn delete_task(&mut self, id: &str) -> Result<()> {
        remove_by_id(&mut self.tasks, id, "Task", |t| t.id.as_str())
    }

    fn delete_bin(&mut self, id: &str) -> Result<()> {
        remove_by_id(&mut self.bins, id, "Bin", |b| b.id.as_str())
    }
}
