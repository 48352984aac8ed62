use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use xs_core::AppError;
use xs_models::{SignInRequest, SignInResponse};

use super::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Sign in with login and password
#[utoipa::path(
    post,
    path = "/api/v1/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; use the token as a bearer token", body = SignInResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid login or password", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let response = AuthService::sign_in(&state.db, &state.issuer, &state.key_id, dto).await?;
    Ok(Json(response))
}
