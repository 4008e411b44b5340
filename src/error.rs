//! Error Types
//!
//! `GradingError` is what the engine's public operations return.
//! `CapabilityError` is what the external collaborators (grader, mailer,
//! student directory) return; the orchestrator records those per essay and
//! never lets them reach task-level status.

use crate::types::TaskStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradingError {
    /// Bad or empty upload, or a start request on a session with no essays
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// The session is locked by an active task
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    /// Unrecoverable fault that aborts a whole batch
    #[error("batch aborted: {0}")]
    BatchFault(String),
    #[error("invalid task transition from {from:?} to {to:?}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
}

impl GradingError {
    pub fn session_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "session",
            id: id.to_string(),
        }
    }

    pub fn task_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "task",
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("malformed backend output: {0}")]
    MalformedOutput(String),
    #[error("rejected by backend: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, GradingError>;
