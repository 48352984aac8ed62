use anyhow::anyhow;
use thiserror::Error;
use xs_core::AppError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("failed to parse private key for kid '{kid}': {reason}")]
    KeyFormat { kid: String, reason: String },
    #[error("failed to read key file '{path}': {reason}")]
    KeyFile { path: String, reason: String },
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("no key registered for kid '{0}'")]
    NotFound(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("token references unknown key '{0}'")]
    UnknownKey(String),
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("invalid claim '{0}'")]
    InvalidClaim(&'static str),
    #[error("subject must be a positive user id")]
    InvalidSubject,
    #[error("incorrect role '{0}', role should be ADMIN or EMPLOYEE")]
    InvalidRole(String),
    #[error("access denied")]
    Forbidden,
}

impl AuthError {
    /// Short label used in logs and metrics. Never includes token contents.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::KeyFormat { .. } => "key_format",
            AuthError::KeyFile { .. } => "key_file",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::NotFound(_) => "not_found",
            AuthError::Signing(_) => "signing",
            AuthError::UnknownKey(_) => "unknown_key",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
            AuthError::NotYetValid => "not_yet_valid",
            AuthError::MalformedToken(_) => "malformed",
            AuthError::InvalidClaim(_) => "invalid_claim",
            AuthError::InvalidSubject => "invalid_subject",
            AuthError::InvalidRole(_) => "invalid_role",
            AuthError::Forbidden => "forbidden",
        }
    }

    /// True for failures that mean "this token cannot be trusted".
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::UnknownKey(_)
                | AuthError::BadSignature
                | AuthError::Expired
                | AuthError::NotYetValid
                | AuthError::MalformedToken(_)
                | AuthError::InvalidClaim(_)
        )
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            e if e.is_rejection() => AppError::unauthorized(anyhow!("Invalid or expired token")),
            AuthError::Forbidden => AppError::forbidden(anyhow!("Access denied")),
            e @ (AuthError::InvalidSubject | AuthError::InvalidRole(_)) => AppError::bad_request(e),
            e => AppError::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rejections_map_to_unauthorized_with_generic_message() {
        for err in [
            AuthError::UnknownKey("k9".to_string()),
            AuthError::BadSignature,
            AuthError::Expired,
            AuthError::NotYetValid,
            AuthError::MalformedToken("bad base64".to_string()),
        ] {
            let app: AppError = err.into();
            assert_eq!(app.status, StatusCode::UNAUTHORIZED);
            assert_eq!(app.public_message(), "Invalid or expired token");
        }
    }

    #[test]
    fn test_forbidden_does_not_name_the_role() {
        let app: AppError = AuthError::Forbidden.into();
        assert_eq!(app.status, StatusCode::FORBIDDEN);
        assert!(!app.public_message().contains("ADMIN"));
        assert!(!app.public_message().contains("EMPLOYEE"));
    }

    #[test]
    fn test_input_errors_are_bad_requests() {
        let app: AppError = AuthError::InvalidRole("MANAGER".to_string()).into();
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
        let app: AppError = AuthError::InvalidSubject.into();
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_key_problems_are_server_errors() {
        let app: AppError = AuthError::Signing("rsa failure".to_string()).into();
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        let app: AppError = AuthError::KeyFormat {
            kid: "k1".to_string(),
            reason: "bad pem".to_string(),
        }
        .into();
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
