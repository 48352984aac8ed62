use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::issuer::{TOKEN_ISSUER, TOKEN_LIFETIME_HOURS};
use crate::roles::Role;

/// Who a token is about. This is everything a caller supplies; the rest of
/// [`Claims`] is fixed policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: i32,
    pub role: Role,
}

impl TokenSubject {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.user_id <= 0 {
            return Err(AuthError::InvalidSubject);
        }
        Ok(())
    }
}

/// Token payload. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub role: Role,
}

impl Claims {
    pub fn new(subject: TokenSubject, now: DateTime<Utc>) -> Self {
        let exp = now + Duration::hours(TOKEN_LIFETIME_HOURS);
        Self {
            iss: TOKEN_ISSUER.to_string(),
            sub: subject.user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: None,
            user_id: subject.user_id,
            role: subject.role,
        }
    }

    pub fn subject(&self) -> TokenSubject {
        TokenSubject::new(self.user_id, self.role)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Valid iff `not_before <= now < exp`, where `not_before` is `nbf` when
    /// present and `iat` otherwise.
    pub fn check_window(&self, now: DateTime<Utc>) -> AuthResult<()> {
        let now = now.timestamp();
        if now < self.nbf.unwrap_or(self.iat) {
            return Err(AuthError::NotYetValid);
        }
        if now >= self.exp {
            return Err(AuthError::Expired);
        }
        Ok(())
    }

    pub fn check_issuer(&self) -> AuthResult<()> {
        if self.iss != TOKEN_ISSUER {
            return Err(AuthError::InvalidClaim("iss"));
        }
        Ok(())
    }

    /// `sub` and `userId` must agree and name a positive id.
    pub fn check_subject(&self) -> AuthResult<()> {
        if self.user_id <= 0 {
            return Err(AuthError::InvalidClaim("userId"));
        }
        if self.sub != self.user_id.to_string() {
            return Err(AuthError::InvalidClaim("sub"));
        }
        Ok(())
    }
}
