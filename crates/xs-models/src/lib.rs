//! # xs-models
//!
//! Database rows and request/response DTOs for the xs-website API.
//!
//! - [`auth`]: sign-in request and response
//! - [`users`]: the `users` row, create/update/patch DTOs, list filters and responses

pub mod auth;
pub mod users;

pub use auth::{MessageResponse, SignInRequest, SignInResponse, SignInUser};
pub use users::{
    AvatarUpload, CreateUserDto, MeResponse, PaginatedUsersResponse, PatchUserDto,
    UpdateUserDto, User, UserFilterParams, UserResponse,
};
