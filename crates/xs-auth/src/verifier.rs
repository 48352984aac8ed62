use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Validation, decode, decode_header};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::keys::KeyStore;

#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyStore>,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Checks run in order and stop at the first failure:
    /// header kid, key lookup, signature, validity window, claim shape.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let header =
            decode_header(token).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::MalformedToken("missing kid header".to_string()))?;

        let key = self.keys.resolve_public(&kid).map_err(|err| match err {
            AuthError::NotFound(kid) => AuthError::UnknownKey(kid),
            other => other,
        })?;

        // Window checks are done below against the caller's clock.
        let mut validation = Validation::new(key.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, key.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::BadSignature
                }
                _ => AuthError::MalformedToken(e.to_string()),
            })?
            .claims;

        claims.check_window(now)?;
        claims.check_issuer()?;
        claims.check_subject()?;
        Ok(claims)
    }
}
