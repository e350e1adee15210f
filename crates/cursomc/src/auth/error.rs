//! Authentication errors and the login failure responder.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

/// Path reported in the login failure body.
pub const LOGIN_PATH: &str = "/login";

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login body could not be parsed into a credential pair.
    #[error("malformed credentials: {0}")]
    MalformedCredentials(String),

    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            AuthError::InvalidCredentials => return LoginFailure::now().into_response(),
            AuthError::MalformedCredentials(_) => {
                (StatusCode::BAD_REQUEST, "malformed_credentials")
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Authentication failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = Json(AuthErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Fixed body returned when a login attempt fails.
///
/// Always 401, whatever the underlying cause.
#[derive(Debug, Clone, Serialize)]
pub struct LoginFailure {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub status: u16,
    pub error: &'static str,
    pub message: &'static str,
    pub path: &'static str,
}

impl LoginFailure {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            status: StatusCode::UNAUTHORIZED.as_u16(),
            error: "Unauthorized",
            message: "Invalid email or password",
            path: LOGIN_PATH,
        }
    }
}

impl IntoResponse for LoginFailure {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
        assert_eq!(
            AuthError::MalformedCredentials("eof".to_string()).to_string(),
            "malformed credentials: eof"
        );
    }

    #[test]
    fn test_login_failure_body() {
        let failure = LoginFailure::now();
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["status"], 401);
        assert_eq!(json["error"], "Unauthorized");
        assert_eq!(json["message"], "Invalid email or password");
        assert_eq!(json["path"], "/login");
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn test_invalid_credentials_maps_to_401() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
