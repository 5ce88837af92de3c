use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;
use uuid::Uuid;

/// Identity of the requesting chat. Only equality and hashing matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier the remote service assigns at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference (usually a URL) to the generated video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One accepted request, as tracked by the registry.
///
/// Cheap to clone: the registry and the owning runner share the same
/// inner record. The task id is bound once, after the create call
/// succeeds; nothing else changes after acquisition.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    inner: Arc<RecordInner>,
}

#[derive(Debug)]
struct RecordInner {
    client_id: ClientId,
    /// Correlates log lines of one run
    run_id: Uuid,
    prompt: String,
    started_at: SystemTime,
    task_id: OnceLock<TaskId>,
}

impl TaskRecord {
    pub(crate) fn new(client_id: ClientId, prompt: String) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                client_id,
                run_id: Uuid::new_v4(),
                prompt,
                started_at: SystemTime::now(),
                task_id: OnceLock::new(),
            }),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.inner.client_id
    }

    pub fn run_id(&self) -> Uuid {
        self.inner.run_id
    }

    pub fn prompt(&self) -> &str {
        &self.inner.prompt
    }

    pub fn started_at(&self) -> SystemTime {
        self.inner.started_at
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.inner.task_id.get()
    }

    /// Returns false if a task id was already bound.
    pub(crate) fn bind_task_id(&self, task_id: TaskId) -> bool {
        self.inner.task_id.set(task_id).is_ok()
    }

    pub fn same_run(&self, other: &TaskRecord) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_binds_once() {
        let record = TaskRecord::new(ClientId::from(7), "a lion at sunset".to_string());
        assert!(record.task_id().is_none());
        assert!(record.bind_task_id(TaskId::new("t1")));
        assert!(!record.bind_task_id(TaskId::new("t2")));
        assert_eq!(record.task_id().map(TaskId::as_str), Some("t1"));
    }

    #[test]
    fn clones_share_the_run() {
        let record = TaskRecord::new(ClientId::from("chat"), "prompt text here".to_string());
        let copy = record.clone();
        record.bind_task_id(TaskId::new("t9"));
        assert!(record.same_run(&copy));
        assert_eq!(copy.task_id().map(TaskId::as_str), Some("t9"));
        assert_eq!(copy.run_id(), record.run_id());
    }

    #[test]
    fn client_id_from_chat_number() {
        assert_eq!(ClientId::from(-1001234), ClientId::new("-1001234"));
    }
}
