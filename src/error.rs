use thiserror::Error;

/// Failures of the remote generation service.
///
/// The message carries diagnostic detail for the logs; it is never shown
/// to the client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The create call failed or came back without a task id.
    #[error("submission failed: {0}")]
    Submission(String),
    /// A single status check failed. Transient by policy.
    #[error("status check failed: {0}")]
    StatusCheck(String),
}

/// Returned by the registry when the client already owns a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a task is already active for this client")]
pub struct AlreadyActive;

/// Why a request was turned away before any task was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("prompt is shorter than {min} characters")]
    TooShort { min: usize },
    #[error(transparent)]
    AlreadyActive(#[from] AlreadyActive),
}
