//! Authorization policy checks.
//!
//! Service operations call these with the caller's principal (or `None` for an
//! unauthenticated request). A missing principal is always denied.

use thiserror::Error;

use super::{Principal, Role};

/// The caller is unauthenticated or lacks the required privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Access denied")]
pub struct AccessDenied;

/// Owning identity of a protected client resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner<'a> {
    /// Owned by the client with this ID.
    Id(i64),
    /// Owned by the client with this email.
    Email(&'a str),
}

impl Owner<'_> {
    fn is(&self, principal: &Principal) -> bool {
        match *self {
            Owner::Id(id) => principal.id == id,
            Owner::Email(email) => principal.email == email,
        }
    }
}

/// Require any authenticated principal.
pub fn require_authenticated(principal: Option<&Principal>) -> Result<&Principal, AccessDenied> {
    principal.ok_or(AccessDenied)
}

/// Require a principal holding `role`.
pub fn require_role(principal: Option<&Principal>, role: Role) -> Result<&Principal, AccessDenied> {
    let principal = require_authenticated(principal)?;
    if principal.has_role(role) {
        Ok(principal)
    } else {
        Err(AccessDenied)
    }
}

/// Require an administrator or the owner of the resource.
pub fn require_owner_or_admin<'p>(
    principal: Option<&'p Principal>,
    owner: Owner<'_>,
) -> Result<&'p Principal, AccessDenied> {
    let principal = require_authenticated(principal)?;
    if principal.is_admin() || owner.is(principal) {
        Ok(principal)
    } else {
        Err(AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Principal {
        Principal::new(1, "maria@example.com", [Role::Customer])
    }

    fn admin() -> Principal {
        Principal::new(2, "ana@example.com", [Role::Customer, Role::Admin])
    }

    #[test]
    fn test_missing_principal_always_denied() {
        assert_eq!(require_authenticated(None), Err(AccessDenied));
        assert_eq!(require_role(None, Role::Customer), Err(AccessDenied));
        assert_eq!(require_owner_or_admin(None, Owner::Id(1)), Err(AccessDenied));
        assert_eq!(
            require_owner_or_admin(None, Owner::Email("maria@example.com")),
            Err(AccessDenied)
        );
    }

    #[test]
    fn test_owner_allowed() {
        let maria = customer();
        assert!(require_owner_or_admin(Some(&maria), Owner::Id(1)).is_ok());
        assert!(require_owner_or_admin(Some(&maria), Owner::Email("maria@example.com")).is_ok());
    }

    #[test]
    fn test_non_owner_denied() {
        let maria = customer();
        for other in [0, 2, 3, 1000, -1] {
            assert_eq!(
                require_owner_or_admin(Some(&maria), Owner::Id(other)),
                Err(AccessDenied)
            );
        }
        assert_eq!(
            require_owner_or_admin(Some(&maria), Owner::Email("ana@example.com")),
            Err(AccessDenied)
        );
        // Email match is exact.
        assert_eq!(
            require_owner_or_admin(Some(&maria), Owner::Email("MARIA@example.com")),
            Err(AccessDenied)
        );
    }

    #[test]
    fn test_admin_allowed_for_anyone() {
        let ana = admin();
        for id in [1, 2, 3, 1000] {
            assert!(require_owner_or_admin(Some(&ana), Owner::Id(id)).is_ok());
        }
        assert!(require_owner_or_admin(Some(&ana), Owner::Email("maria@example.com")).is_ok());
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(Some(&admin()), Role::Admin).is_ok());
        assert_eq!(require_role(Some(&customer()), Role::Admin), Err(AccessDenied));
        assert!(require_role(Some(&customer()), Role::Customer).is_ok());
    }
}
