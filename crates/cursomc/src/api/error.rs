//! Unified API error handling with structured responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::error::ServiceError;
use crate::validation::FieldMessage;

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error")]
    Validation(Vec<FieldMessage>),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldMessage>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        match &self {
            ApiError::Internal(msg) => {
                error!(error_code = code, message = %msg, "API error");
            }
            _ => {
                tracing::debug!(error_code = code, message = %message, "Client error");
            }
        }

        let errors = match self {
            ApiError::Validation(errors) => errors,
            _ => Vec::new(),
        };

        let body = ErrorResponse {
            error: message,
            code,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::AccessDenied(denied) => ApiError::Forbidden(denied.to_string()),
            ServiceError::DataIntegrity(msg) | ServiceError::BadRequest(msg) => {
                ApiError::BadRequest(msg)
            }
            ServiceError::Validation(errors) => ApiError::Validation(errors.into_errors()),
            ServiceError::Storage(e) => ApiError::Internal(format!("Storage error: {}", e)),
            ServiceError::Internal(e) => ApiError::Internal(format!("{:#}", e)),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessDenied;
    use crate::validation::ValidationErrors;

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (ServiceError::not_found("Client not found: 3"), StatusCode::NOT_FOUND),
            (ServiceError::from(AccessDenied), StatusCode::FORBIDDEN),
            (ServiceError::data_integrity("FOREIGN KEY constraint failed"), StatusCode::BAD_REQUEST),
            (ServiceError::bad_request("lines_per_page"), StatusCode::BAD_REQUEST),
            (ServiceError::Validation(ValidationErrors::new()), StatusCode::UNPROCESSABLE_ENTITY),
            (ServiceError::Internal(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_forbidden_body() {
        let err = ApiError::from(ServiceError::from(AccessDenied));
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert_eq!(err.to_string(), "Forbidden: Access denied");
    }

    #[test]
    fn test_validation_errors_serialized() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Required field");
        let body = ErrorResponse {
            error: "Validation error".to_string(),
            code: "VALIDATION_ERROR",
            errors: errors.into_errors(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["errors"][0]["field_name"], "name");
        assert_eq!(json["errors"][0]["message"], "Required field");

        let json = serde_json::to_value(ErrorResponse {
            error: "x".to_string(),
            code: "NOT_FOUND",
            errors: Vec::new(),
        })
        .unwrap();
        assert!(json.get("errors").is_none());
    }
}
