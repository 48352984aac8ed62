use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use xs_auth::Role;
use xs_core::{PaginationMeta, PaginationParams};
use xs_models::{
    CreateUserDto, MeResponse, MessageResponse, PaginatedUsersResponse, PatchUserDto,
    SignInRequest, SignInResponse, SignInUser, UpdateUserDto, UserResponse,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::sign_in,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::patch_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::get_me,
    ),
    components(
        schemas(
            Role,
            SignInRequest,
            SignInResponse,
            SignInUser,
            UserResponse,
            MeResponse,
            CreateUserDto,
            UpdateUserDto,
            PatchUserDto,
            PaginatedUsersResponse,
            PaginationMeta,
            PaginationParams,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-in and token issuance"),
        (name = "Users", description = "User administration and the caller's profile")
    ),
    info(
        title = "xs-website API",
        version = "0.1.0",
        description = "Backend of the xs-website: RSA-signed bearer tokens, role-gated user management.",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
