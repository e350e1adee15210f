//! Service-layer errors.

use thiserror::Error;

use crate::auth::AccessDenied;
use crate::picture::PictureError;
use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Caller is unauthenticated or not allowed to perform the operation.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// A foreign-key or uniqueness constraint was violated.
    #[error("{0}")]
    DataIntegrity(String),

    /// One or more input fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Malformed request parameters.
    #[error("{0}")]
    BadRequest(String),

    /// Media storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }
}

/// Constraint violations anywhere in the error chain become `DataIntegrity`.
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        let violation = err
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .filter(|db| db.is_foreign_key_violation() || db.is_unique_violation())
            .map(|db| db.message().to_string());

        match violation {
            Some(message) => Self::DataIntegrity(message),
            None => Self::Internal(err),
        }
    }
}

impl From<PictureError> for ServiceError {
    fn from(err: PictureError) -> Self {
        match err {
            PictureError::Encode(_) => Self::Internal(anyhow::Error::new(err)),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}
