use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Header, encode};

use crate::claims::{Claims, TokenSubject};
use crate::error::{AuthError, AuthResult};
use crate::keys::KeyStore;

pub const TOKEN_ISSUER: &str = "xs-website";
pub const TOKEN_LIFETIME_HOURS: i64 = 8760;

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyStore>,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }

    pub fn issue(&self, kid: &str, subject: TokenSubject) -> AuthResult<String> {
        self.issue_at(kid, subject, Utc::now())
    }

    /// Signs a token whose validity window starts at `now`.
    pub fn issue_at(
        &self,
        kid: &str,
        subject: TokenSubject,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        subject.validate()?;

        let key = self.keys.signing_key(kid).map_err(|_| {
            AuthError::Signing(format!("no private key registered for kid '{}'", kid))
        })?;

        let mut header = Header::new(key.algorithm);
        header.kid = Some(kid.to_string());

        let claims = Claims::new(subject, now);
        encode(&header, &claims, &key.encoding).map_err(|e| AuthError::Signing(e.to_string()))
    }
}
