use anyhow::Result;
use async_trait::async_trait;
use crate::runtime::task::{ArtifactRef, ClientId};

pub mod console;
pub mod log;
pub mod messages;

/// Coarse reason shown to the client when a started task fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The create call failed or returned no task id. Both cases share one
    /// reason so the reply never hints at which one happened.
    SubmissionFailed,
    /// Every poll attempt came back without a video
    TimedOut,
}

/// Delivers progress and results back to the chat.
///
/// Callers log and swallow errors from every method: a failed delivery
/// never changes a task's outcome or skips its cleanup.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_welcome(&self, client: &ClientId) -> Result<()>;
    async fn notify_usage(&self, client: &ClientId) -> Result<()>;
    async fn notify_rejected_too_short(&self, client: &ClientId) -> Result<()>;
    async fn notify_rejected_already_active(&self, client: &ClientId) -> Result<()>;
    async fn notify_started(&self, client: &ClientId, prompt: &str) -> Result<()>;
    async fn notify_waiting(&self, client: &ClientId) -> Result<()>;
    async fn notify_success(&self, client: &ClientId, prompt: &str, artifact: &ArtifactRef) -> Result<()>;
    async fn notify_failure(&self, client: &ClientId, prompt: &str, reason: FailureReason) -> Result<()>;
}
