//! Role gate for routes and handlers.
//!
//! Roles are disjoint: a route that requires ADMIN rejects EMPLOYEE tokens
//! and vice versa. Denials carry a generic "Access denied" body.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use xs_auth::{Role, ensure_role};
use xs_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn check_role(auth_user: &AuthUser, required: Role) -> Result<(), AppError> {
    ensure_role(&auth_user.0, required).map_err(|err| {
        tracing::warn!(
            user_id = auth_user.user_id(),
            role = %auth_user.role(),
            "role gate denied request"
        );
        AppError::from(err)
    })
}

/// Verifies the token, applies the gate, and stores the [`AuthUser`] for the handler.
pub async fn require_role(
    state: &AppState,
    req: Request,
    next: Next,
    required: Role,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;
    check_role(&auth_user, required)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Route layer for admin-only routes, used with `middleware::from_fn_with_state`.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, req, next, Role::Admin).await
}

/// Extractor form of the admin gate.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        check_role(&auth_user, Role::Admin)?;
        Ok(RequireAdmin(auth_user))
    }
}
