//! Sign-in models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use xs_auth::Role;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "login is required"))]
    #[schema(example = "Admin")]
    pub login: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "1")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInUser {
    pub id: i32,
    pub login: String,
    pub full_name: Option<String>,
    pub role: Role,
}

/// Successful sign-in. `token` is sent back as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    pub token: String,
    pub user: SignInUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_request_requires_both_fields() {
        let req = SignInRequest {
            login: String::new(),
            password: "1".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("login"));

        let req = SignInRequest {
            login: "Admin".to_string(),
            password: "1".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
