use redis_connection::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error payload delivered to the session that initiated a
/// failed action. Other sessions never see failed mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid request: {reason}")]
    Validation { reason: String },
    #[error("a connection request already exists for this pair")]
    Conflict,
    #[error("connection request not found")]
    NotFound,
    #[error("acting user may not resolve this request")]
    Unauthorized,
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl NetworkError {
    pub fn validation(reason: &str) -> Self {
        Self::Validation {
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Store(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Wire payload for the initiating session. Store and internal
    /// failures get a fixed message so operational detail stays in the
    /// logs.
    pub fn to_event(&self) -> ErrorEvent {
        let message = match self {
            Self::Store(_) => {
                "the request could not be completed, try again".to_string()
            }
            Self::Internal(_) => "an unexpected error occurred".to_string(),
            other => other.to_string(),
        };
        ErrorEvent {
            code: self.code().to_string(),
            message,
        }
    }
}

pub type NetworkResult<T> = Result<T, NetworkError>;
