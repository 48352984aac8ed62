use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use xs_core::AppError;
use xs_models::{
    CreateUserDto, MeResponse, MessageResponse, PaginatedUsersResponse, PatchUserDto,
    UpdateUserDto, UserFilterParams, UserResponse,
};

use super::form::UserForm;
use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::validate;

/// List users, newest first
#[utoipa::path(
    get,
    path = "/api/v1/user/list",
    params(
        ("search" = Option<String>, Query, description = "Match on full name, whitespace ignored"),
        ("role" = Option<String>, Query, description = "ADMIN or EMPLOYEE"),
        ("limit" = Option<i64>, Query, description = "Page size (default 10, max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip"),
        ("page" = Option<i64>, Query, description = "1-based page; wins over offset")
    ),
    responses(
        (status = 200, description = "Page of users", body = PaginatedUsersResponse),
        (status = 400, description = "Unknown role filter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_users(&state.db, state.storage.as_ref(), filter).await?;
    Ok(Json(users))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/user/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::get_user(&state.db, state.storage.as_ref(), id).await?;
    Ok(Json(user))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/user/create",
    request_body(content = CreateUserDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing field, unknown role or bad avatar", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 409, description = "Login already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user, multipart), fields(actor = auth_user.user_id()))]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let (dto, avatar) = UserForm::from_multipart(multipart).await?.into_create()?;
    validate(&dto)?;

    let user = UserService::create_user(
        &state.db,
        state.storage.as_ref(),
        auth_user.user_id(),
        dto,
        avatar,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace a user
#[utoipa::path(
    put,
    path = "/api/v1/user/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body(content = UpdateUserDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Missing field, unknown role or bad avatar", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Login already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user, multipart), fields(actor = auth_user.user_id()))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let (dto, avatar) = UserForm::from_multipart(multipart).await?.into_update()?;
    validate(&dto)?;

    UserService::update_user(
        &state.db,
        state.storage.as_ref(),
        auth_user.user_id(),
        id,
        dto,
        avatar,
    )
    .await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// Update some fields of a user
#[utoipa::path(
    patch,
    path = "/api/v1/user/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body(content = PatchUserDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Unknown role or bad avatar", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Login already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user, multipart), fields(actor = auth_user.user_id()))]
pub async fn patch_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let (dto, avatar) = UserForm::from_multipart(multipart).await?.into_patch();
    validate(&dto)?;

    UserService::patch_user(
        &state.db,
        state.storage.as_ref(),
        auth_user.user_id(),
        id,
        dto,
        avatar,
    )
    .await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// Soft-delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/user/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user), fields(actor = auth_user.user_id()))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::delete_user(&state.db, auth_user.user_id(), id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Profile of the signed-in user (any role)
#[utoipa::path(
    get,
    path = "/api/v1/user/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id()))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let me = UserService::get_me(&state.db, state.storage.as_ref(), auth_user.user_id()).await?;
    Ok(Json(me))
}
