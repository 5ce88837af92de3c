use std::sync::Arc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use crate::error::AlreadyActive;
use crate::runtime::task::{ClientId, TaskId, TaskRecord};

/// Process-wide map of in-flight tasks, at most one per client.
///
/// Starts empty. Entries are only added through [`TaskRegistry::try_acquire`]
/// and only removed through [`TaskRegistry::release`] (directly, or by
/// dropping the [`TaskGuard`]).
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: DashMap<ClientId, TaskRecord>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Atomically claims the slot for `client_id`.
    ///
    /// The check and the insert happen under the same shard lock, so two
    /// concurrent callers for one client can never both succeed.
    pub fn try_acquire(
        self: &Arc<Self>,
        client_id: ClientId,
        prompt: impl Into<String>,
    ) -> Result<TaskGuard, AlreadyActive> {
        let record = match self.tasks.entry(client_id.clone()) {
            Entry::Occupied(_) => return Err(AlreadyActive),
            Entry::Vacant(slot) => {
                let record = TaskRecord::new(client_id, prompt.into());
                slot.insert(record.clone());
                record
            }
        };
        debug!(client = %record.client_id(), run_id = %record.run_id(), "Task slot acquired");
        Ok(TaskGuard {
            registry: Arc::clone(self),
            record,
        })
    }

    /// Removes whatever is registered for `client_id`. Releasing an absent
    /// key is a no-op.
    pub fn release(&self, client_id: &ClientId) {
        if let Some((_, record)) = self.tasks.remove(client_id) {
            debug!(client = %client_id, run_id = %record.run_id(), "Task slot released");
        }
    }

    /// Removes the slot only if it still holds `record`. A guard whose slot
    /// was already released and re-acquired must not evict the newer run.
    fn release_run(&self, record: &TaskRecord) {
        let client_id = record.client_id();
        if self.tasks.remove_if(client_id, |_, stored| stored.same_run(record)).is_some() {
            debug!(client = %client_id, run_id = %record.run_id(), "Task slot released");
        }
    }

    pub fn is_active(&self, client_id: &ClientId) -> bool {
        self.tasks.contains_key(client_id)
    }

    pub fn get(&self, client_id: &ClientId) -> Option<TaskRecord> {
        self.tasks.get(client_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Ownership of one registry slot. Dropping it releases the slot, so every
/// exit path of a runner (including a panic) cleans up exactly once.
#[derive(Debug)]
pub struct TaskGuard {
    registry: Arc<TaskRegistry>,
    record: TaskRecord,
}

impl TaskGuard {
    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    pub fn client_id(&self) -> &ClientId {
        self.record.client_id()
    }

    /// Stores the service-assigned id in the registered record.
    pub fn bind_task_id(&self, task_id: TaskId) {
        if !self.record.bind_task_id(task_id) {
            debug!(run_id = %self.record.run_id(), "Task id already bound, keeping the first one");
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.registry.release_run(&self.record);
    }
}
