use async_trait::async_trait;
use crate::error::ServiceError;
use crate::runtime::task::{ArtifactRef, TaskId};

pub mod http;

/// Result of one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    Ready(ArtifactRef),
    Pending,
}

/// The remote generation service: stateless request/response.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submits a prompt. Fails with [`ServiceError::Submission`] when no task
    /// id comes back.
    async fn create(&self, prompt: &str) -> Result<TaskId, ServiceError>;

    /// Asks whether the task is done. Idempotent and safe to repeat.
    async fn check_status(&self, task_id: &TaskId) -> Result<StatusOutcome, ServiceError>;
}
