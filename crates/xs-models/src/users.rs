//! User models and DTOs.
//!
//! [`User`] mirrors a row of the `users` table. Handlers never serialize it
//! directly; they answer with [`UserResponse`], which drops the password hash
//! and replaces the avatar storage key with its public URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;
use xs_auth::{AuthResult, Role};
use xs_core::{PaginationMeta, PaginationParams};

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub login: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Storage key of the uploaded avatar, not a URL
    pub avatar: Option<String>,
    pub role: String,
    pub status: Option<bool>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i32>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<i32>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i32>,
}

impl User {
    /// The stored role, parsed into the closed [`Role`] set.
    pub fn role(&self) -> AuthResult<Role> {
        self.role.parse()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub login: String,
    pub full_name: Option<String>,
    /// Public URL of the avatar
    pub avatar: Option<String>,
    pub role: Role,
    pub status: bool,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub login: String,
    pub avatar: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// An image received in the `avatar` multipart field.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// `POST /api/v1/user/create`. Sent as `multipart/form-data`; an optional
/// `avatar` file part may accompany the text fields.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 255, message = "login must not be empty"))]
    pub login: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    /// ADMIN or EMPLOYEE, case-insensitive
    #[schema(example = "EMPLOYEE")]
    pub role: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// `PUT /api/v1/user/{id}`: every column is replaced.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 255, message = "login must not be empty"))]
    pub login: String,
    pub full_name: String,
    pub phone: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    #[schema(example = "EMPLOYEE")]
    pub role: String,
}

/// `PATCH /api/v1/user/{id}`: only the fields present are written.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PatchUserDto {
    #[validate(length(min = 1, max = 255, message = "login must not be empty"))]
    pub login: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: Option<String>,
    pub role: Option<String>,
}

impl PatchUserDto {
    pub fn is_empty(&self) -> bool {
        self.login.is_none()
            && self.full_name.is_none()
            && self.phone.is_none()
            && self.password.is_none()
            && self.role.is_none()
    }
}

/// Query parameters for `GET /api/v1/user/list`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserFilterParams {
    /// Case-insensitive match on full name; whitespace is ignored
    pub search: Option<String>,
    /// ADMIN or EMPLOYEE
    pub role: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl UserFilterParams {
    /// `%term%` for `ILIKE`, or `None` when the search is blank.
    pub fn search_pattern(&self) -> Option<String> {
        let term: String = self
            .search
            .as_deref()?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if term.is_empty() {
            return None;
        }
        Some(format!("%{}%", term))
    }

    /// Blank values mean "no filter"; anything else must be a known role.
    pub fn role_filter(&self) -> AuthResult<Option<Role>> {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserResponse>,
    pub meta: PaginationMeta,
}
