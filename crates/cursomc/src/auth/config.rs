//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Placeholder secret that older deployments shipped with. Never accepted.
const INSECURE_DEFAULT_SECRET: &str = "change-me-in-production";

/// Minimum accepted secret length for HS256.
const MIN_SECRET_LEN: usize = 32;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Supports `env:VAR_NAME` indirection.
    pub jwt_secret: Option<String>,

    /// Token validity window in seconds.
    pub token_ttl_secs: i64,

    /// Allowed CORS origins. If empty, cross-origin requests are denied.
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 60 * 60 * 24,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8100".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration and return the resolved secret.
    pub fn validate(&self) -> Result<String, ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret == INSECURE_DEFAULT_SECRET {
            return Err(ConfigValidationError::InsecureJwtSecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }
        if self.token_ttl_secs <= 0 {
            return Err(ConfigValidationError::InvalidTokenTtl(self.token_ttl_secs));
        }

        Ok(secret)
    }

    /// Generate a random alphanumeric JWT secret from the OS-backed RNG.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// No JWT secret configured.
    MissingJwtSecret,
    /// JWT secret is the insecure placeholder value.
    InsecureJwtSecret,
    /// JWT secret is shorter than 32 characters.
    JwtSecretTooShort,
    /// Token TTL is zero or negative.
    InvalidTokenTtl(i64),
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingJwtSecret => write!(
                f,
                "JWT secret is required. Set CURSOMC__AUTH__JWT_SECRET or auth.jwt_secret in config."
            ),
            Self::InsecureJwtSecret => write!(
                f,
                "JWT secret cannot be the placeholder value. Please configure a secure secret."
            ),
            Self::JwtSecretTooShort => write!(
                f,
                "JWT secret must be at least {} characters long.",
                MIN_SECRET_LEN
            ),
            Self::InvalidTokenTtl(ttl) => {
                write!(f, "auth.token_ttl_secs must be positive (got {}).", ttl)
            }
            Self::EnvVarNotFound(var) => write!(
                f,
                "Environment variable '{}' not found (referenced via env:{} in config).",
                var, var
            ),
            Self::EnvVarEmpty(var) => write!(
                f,
                "Environment variable '{}' is empty (referenced via env:{} in config).",
                var, var
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: Some(secret.to_string()),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.token_ttl_secs, 86_400);
    }

    #[test]
    fn test_validation_missing_secret() {
        assert_eq!(
            AuthConfig::default().validate().unwrap_err(),
            ConfigValidationError::MissingJwtSecret
        );
    }

    #[test]
    fn test_validation_insecure_secret() {
        assert_eq!(
            config_with_secret(INSECURE_DEFAULT_SECRET)
                .validate()
                .unwrap_err(),
            ConfigValidationError::InsecureJwtSecret
        );
    }

    #[test]
    fn test_validation_short_secret() {
        assert_eq!(
            config_with_secret("tooshort").validate().unwrap_err(),
            ConfigValidationError::JwtSecretTooShort
        );
    }

    #[test]
    fn test_validation_bad_ttl() {
        let mut config = config_with_secret("a-very-long-and-secure-jwt-secret-of-at-least-32");
        config.token_ttl_secs = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::InvalidTokenTtl(0)
        );
    }

    #[test]
    fn test_validation_valid() {
        let secret = "a-very-long-and-secure-jwt-secret-of-at-least-32";
        assert_eq!(config_with_secret(secret).validate().unwrap(), secret);
    }

    #[test]
    fn test_generate_jwt_secret_passes_validation() {
        let secret = AuthConfig::generate_jwt_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(config_with_secret(&secret).validate().is_ok());
    }

    #[test]
    fn test_generate_jwt_secret_uniqueness() {
        let a = AuthConfig::generate_jwt_secret();
        let b = AuthConfig::generate_jwt_secret();
        assert_ne!(a, b);
    }

    #[test]
    fn test_resolve_jwt_secret_env_var() {
        // SAFETY: test-only environment variable with a unique name
        unsafe {
            std::env::set_var(
                "CURSOMC_TEST_JWT_SECRET_7781",
                "secret-from-env-var-at-least-32-chars",
            );
        }

        let config = config_with_secret("env:CURSOMC_TEST_JWT_SECRET_7781");
        assert_eq!(
            config.resolve_jwt_secret().unwrap(),
            Some("secret-from-env-var-at-least-32-chars".to_string())
        );

        // SAFETY: cleaning up the variable set above
        unsafe {
            std::env::remove_var("CURSOMC_TEST_JWT_SECRET_7781");
        }
    }

    #[test]
    fn test_resolve_jwt_secret_env_var_not_found() {
        let config = config_with_secret("env:CURSOMC_NONEXISTENT_VAR_7781");
        assert_eq!(
            config.resolve_jwt_secret().unwrap_err(),
            ConfigValidationError::EnvVarNotFound("CURSOMC_NONEXISTENT_VAR_7781".to_string())
        );
    }
}
