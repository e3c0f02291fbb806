use std::path::PathBuf;
use studenthub_core::{AppError, SessionId};
use thiserror::Error;

/// Session store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(SessionId),

    #[error("Session {0} expired")]
    Expired(SessionId),

    #[error("Session {0} has no output yet")]
    NoOutput(SessionId),

    #[error("Session {id} failed: {reason}")]
    Failed { id: SessionId, reason: String },

    #[error("Session TTL must be greater than zero")]
    InvalidTtl,

    #[error("Path {} is already owned by another session", .0.display())]
    PathInUse(PathBuf),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => AppError::NotFound(format!("Session {} not found", id)),
            SessionError::Expired(id) => AppError::Expired(format!("Session {} expired", id)),
            SessionError::NoOutput(id) => {
                AppError::NotReady(format!("Session {} is still processing", id))
            }
            SessionError::Failed { reason, .. } => AppError::ProcessingFailed(reason),
            SessionError::InvalidTtl | SessionError::PathInUse(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
