//! Authentication middleware.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Duration;
use log::{debug, warn};
use std::convert::Infallible;
use std::sync::Arc;

use super::{
    AccountStore, AuthConfig, AuthError, Authenticator, ConfigValidationError, Principal,
    TokenError, TokenService,
};

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.next()?;
    if token.is_empty() || parts.next().is_some() {
        return None;
    }

    Some(token)
}

/// Authentication state shared across handlers.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    tokens: TokenService,
    authenticator: Authenticator,
}

impl AuthState {
    /// Create auth state from config.
    ///
    /// Fails if the signing secret is missing, insecure or unresolvable.
    pub fn new(
        config: AuthConfig,
        accounts: Arc<dyn AccountStore>,
    ) -> Result<Self, ConfigValidationError> {
        let secret = config.validate()?;
        let tokens = TokenService::new(secret.as_bytes(), Duration::seconds(config.token_ttl_secs));

        Ok(Self {
            config: Arc::new(config),
            tokens,
            authenticator: Authenticator::new(accounts),
        })
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Issue a fresh token for an authenticated principal.
    pub fn issue_token(&self, principal: &Principal) -> Result<String, AuthError> {
        self.tokens
            .issue(&principal.email)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Resolve the caller from an Authorization header value.
    ///
    /// Returns `None` for a missing or non-Bearer header, a token that fails
    /// verification, or an identity that no longer exists.
    pub async fn principal_from_header(&self, header_value: Option<&str>) -> Option<Principal> {
        let token = bearer_token_from_header(header_value?)?;

        let identity = match self.tokens.verify(token) {
            Ok(identity) => identity,
            Err(TokenError::Expired) => {
                debug!("Ignoring expired bearer token");
                return None;
            }
            Err(e) => {
                debug!("Ignoring invalid bearer token: {}", e);
                return None;
            }
        };

        match self.authenticator.load_principal(&identity).await {
            Ok(principal) => principal,
            Err(e) => {
                warn!("Failed to load principal for {}: {}", identity, e);
                None
            }
        }
    }
}

/// Authentication middleware.
///
/// Injects a `Principal` into request extensions when the request carries a
/// valid bearer token. Never rejects: the request proceeds unauthenticated
/// otherwise and the service layer decides what is allowed.
pub async fn authenticate(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Some(principal) = auth.principal_from_header(header).await {
        req.extensions_mut().insert(principal);
    }

    next.run(req).await
}

/// The caller's principal, if the request was authenticated.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

impl MaybePrincipal {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(parts.extensions.get::<Principal>().cloned()))
    }
}
