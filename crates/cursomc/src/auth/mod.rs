//! Authentication and authorization.
//!
//! Login exchanges an email/password pair for a signed bearer token. The
//! middleware turns a valid token back into a [`Principal`] on every request,
//! and the [`policy`] checks decide what that principal may do.

mod claims;
mod config;
mod credentials;
mod error;
mod middleware;
mod password;
pub mod policy;
mod principal;
mod token;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigValidationError};
pub use credentials::{Account, AccountStore, Authenticator, Credentials};
pub use error::{AuthError, LOGIN_PATH, LoginFailure};
pub use middleware::{AuthState, MaybePrincipal, authenticate};
pub use password::{hash_password, verify_password};
pub use policy::{AccessDenied, Owner};
pub use principal::{Principal, Role};
pub use token::{TokenError, TokenService};
