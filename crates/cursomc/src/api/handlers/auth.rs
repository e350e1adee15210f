//! Authentication handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{
        StatusCode,
        header::{ACCESS_CONTROL_EXPOSE_HEADERS, AUTHORIZATION},
    },
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::policy::require_authenticated;
use crate::auth::{AuthError, Credentials, MaybePrincipal};
use crate::error::ServiceError;

/// Header list announced to browsers in `Access-Control-Expose-Headers`.
const EXPOSED_HEADERS: &str = "Authorization";

/// Empty 200 response carrying the token in the `Authorization` header.
fn bearer_response(token: &str) -> Response {
    (
        StatusCode::OK,
        [
            (AUTHORIZATION, format!("Bearer {token}")),
            (ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSED_HEADERS.to_string()),
        ],
    )
        .into_response()
}

/// Exchange an email/password pair for a bearer token.
///
/// Failures answer with the fixed login failure body and never say whether
/// the email or the password was wrong.
#[instrument(skip(state, body))]
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Response, AuthError> {
    let credentials = Credentials::from_json(&body)?;
    let principal = state.auth.authenticator().authenticate(&credentials).await?;
    let token = state.auth.issue_token(&principal)?;

    info!(client_id = principal.id, "Login succeeded");
    Ok(bearer_response(&token))
}

/// Issue a fresh token to an authenticated caller.
#[instrument(skip(state, principal))]
pub async fn refresh_token(
    State(state): State<AppState>,
    principal: MaybePrincipal,
) -> ApiResult<Response> {
    let principal = require_authenticated(principal.principal()).map_err(ServiceError::from)?;
    let token = state
        .auth
        .issue_token(principal)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(bearer_response(&token))
}
