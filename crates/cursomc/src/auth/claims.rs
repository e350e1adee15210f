//! JWT claims.

use serde::{Deserialize, Serialize};

/// Claims carried by an issued bearer token.
///
/// Only the identity travels in the token. Roles are looked up again on every
/// request so that the store stays the single source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (client email).
    pub sub: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Whether the token has expired at `now` (Unix timestamp).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired_at() {
        let claims = Claims {
            sub: "maria@example.com".to_string(),
            iat: 100,
            exp: 200,
        };
        assert!(!claims.is_expired_at(199));
        assert!(claims.is_expired_at(200));
        assert!(claims.is_expired_at(201));
    }
}
