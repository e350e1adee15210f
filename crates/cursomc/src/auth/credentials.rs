//! Credential extraction and the authentication delegate.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument};

use super::password::{hash_password, verify_password};
use super::{AuthError, Principal, Role};

/// Email/password pair submitted to `POST /login`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Parse a raw JSON login body.
    pub fn from_json(body: &[u8]) -> Result<Self, AuthError> {
        serde_json::from_slice(body).map_err(|e| AuthError::MalformedCredentials(e.to_string()))
    }
}

/// Stored login data for one client.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl Account {
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            email: self.email,
            roles: self.roles,
        }
    }
}

/// Lookup of accounts by email.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find the account registered under `email`.
    async fn find_account(&self, email: &str) -> anyhow::Result<Option<Account>>;
}

/// Hash checked when the email is unknown, at the same cost as stored hashes.
static UNKNOWN_ACCOUNT_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("unknown-account").unwrap_or_default());

type Verifier = fn(&str, &str) -> bool;

/// Verifies credential pairs and rebuilds principals from token identities.
#[derive(Clone)]
pub struct Authenticator {
    accounts: Arc<dyn AccountStore>,
    verifier: Verifier,
}

impl Authenticator {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            accounts,
            verifier: verify_password,
        }
    }

    /// Check `credentials` against the stored bcrypt hash.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`, and
    /// both run one hash comparison.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let account = self.find(&credentials.email).await?;
        let hash = match &account {
            Some(account) => account.password_hash.clone(),
            None => UNKNOWN_ACCOUNT_HASH.clone(),
        };

        let password = credentials.password.clone();
        let verify = self.verifier;
        let matches = tokio::task::spawn_blocking(move || verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))?;

        match account {
            Some(account) if matches => Ok(account.into_principal()),
            Some(_) => {
                debug!("Login attempt with wrong password");
                Err(AuthError::InvalidCredentials)
            }
            None => {
                debug!("Login attempt for unknown email");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Rebuild the principal for a verified token identity.
    pub async fn load_principal(&self, email: &str) -> Result<Option<Principal>, AuthError> {
        Ok(self.find(email).await?.map(Account::into_principal))
    }

    async fn find(&self, email: &str) -> Result<Option<Account>, AuthError> {
        self.accounts
            .find_account(email)
            .await
            .map_err(|e| AuthError::Internal(format!("account lookup failed: {e:#}")))
    }
}
