use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Exact match only: there is no role hierarchy.
pub fn authorize(claims: &Claims, required: Role) -> Decision {
    if claims.role == required {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

pub fn ensure_role(claims: &Claims, required: Role) -> AuthResult<()> {
    match authorize(claims, required) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(AuthError::Forbidden),
    }
}
