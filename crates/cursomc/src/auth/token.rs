//! Bearer token issuance and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use super::Claims;

/// Token verification and signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature does not match the server key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Expiry timestamp has passed.
    #[error("token expired")]
    Expired,

    /// Not a decodable token, or required claims are missing.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Encoding a new token failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies signed, time-limited bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for `identity`, valid from now until now + TTL.
    pub fn issue(&self, identity: &str) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: identity.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry and return the embedded identity.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against the clock value `now`.
    ///
    /// The signature is checked first; expiry is compared without leeway.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        if data.claims.is_expired_at(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-for-unit-tests-minimum-32-chars-long";
    const OTHER_SECRET: &[u8] = b"another-secret-for-unit-tests-minimum-32-chars";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(1))
    }

    #[test]
    fn test_issue_then_verify_returns_identity() {
        let tokens = service();
        for identity in ["maria@example.com", "ana@example.com", "x@y.z"] {
            let token = tokens.issue(identity).unwrap();
            assert_eq!(tokens.verify(&token).unwrap(), identity);
        }
    }

    #[test]
    fn test_verify_just_before_expiry() {
        let tokens = service();
        let issued_at = Utc::now();
        let token = tokens.issue_at("maria@example.com", issued_at).unwrap();

        let almost = issued_at + Duration::hours(1) - Duration::seconds(1);
        assert_eq!(
            tokens.verify_at(&token, almost).unwrap(),
            "maria@example.com"
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(2);
        let token = tokens.issue_at("maria@example.com", issued_at).unwrap();

        assert_eq!(tokens.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_token_rejected_exactly_at_expiry() {
        let tokens = service();
        let issued_at = Utc::now();
        let token = tokens.issue_at("maria@example.com", issued_at).unwrap();

        let at_expiry = issued_at + Duration::hours(1);
        assert_eq!(
            tokens.verify_at(&token, at_expiry).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let ours = service();
        let theirs = TokenService::new(OTHER_SECRET, Duration::hours(1));
        let token = theirs.issue("maria@example.com").unwrap();

        assert_eq!(
            ours.verify(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_expired_token_from_other_key_rejected() {
        let ours = service();
        let theirs = TokenService::new(OTHER_SECRET, Duration::hours(1));
        let token = theirs
            .issue_at("maria@example.com", Utc::now() - Duration::days(1))
            .unwrap();

        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = service();
        let token = tokens.issue("maria@example.com").unwrap();
        let other = tokens.issue("ana@example.com").unwrap();

        // Header and signature from one token, payload from another.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(
            tokens.verify(&forged).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service();
        assert!(matches!(
            tokens.verify("not-a-token").unwrap_err(),
            TokenError::Malformed(_)
        ));
        assert!(matches!(
            tokens.verify("").unwrap_err(),
            TokenError::Malformed(_)
        ));
    }
}
