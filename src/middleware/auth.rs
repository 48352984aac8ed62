use anyhow::anyhow;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use xs_auth::{AuthError, Claims, Role};
use xs_core::AppError;

use crate::metrics::track_token_rejected;
use crate::state::AppState;

/// Verified caller. Extracting it runs the full token verification unless an
/// earlier layer already stored it in the request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(anyhow!("Missing authorization header")))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid authorization header format")))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AppError::unauthorized(anyhow!(
            "Invalid authorization header format"
        )));
    }

    Ok(token.trim())
}

pub(crate) fn reject(err: AuthError) -> AppError {
    tracing::warn!(reason = err.kind(), "token rejected");
    track_token_rejected(err.kind());
    err.into()
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers)?;
        let claims = state.verifier.verify(token).map_err(reject)?;

        let user = AuthUser(claims);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
