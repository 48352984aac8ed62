//! Out-of-band token issuance.
//!
//! Every argument is optional at the parser level. A missing or invalid value
//! prints [`USAGE`] and yields [`CliError::HelpRequested`], which the binary
//! treats as a clean exit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonwebtoken::Algorithm;
use xs_auth::{KeyStore, Role, TokenIssuer, TokenSubject, parse_algorithm};
use xs_config::jwt::DEFAULT_KEY_ID;

use crate::error::CliError;

pub const USAGE: &str = "\
help: xs-cli gentoken <user_id> <role> <private_key_file> <algorithm>
  user_id           positive integer id of the token subject
  role              ADMIN or EMPLOYEE
  private_key_file  RSA private key in PEM format
  algorithm         RS256, RS384 or RS512";

#[derive(Debug, Clone, Default)]
pub struct GenTokenArgs {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub private_key_file: Option<PathBuf>,
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub subject: TokenSubject,
    pub private_key_file: PathBuf,
    pub algorithm: Algorithm,
}

impl GenTokenArgs {
    pub fn new(
        user_id: impl Into<String>,
        role: impl Into<String>,
        private_key_file: impl Into<PathBuf>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role: Some(role.into()),
            private_key_file: Some(private_key_file.into()),
            algorithm: Some(algorithm.into()),
        }
    }

    /// Turns raw arguments into a request, or `HelpRequested` if any is unusable.
    pub fn resolve(self) -> Result<TokenRequest, CliError> {
        let user_id = self
            .user_id
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .filter(|id| *id > 0);
        let role = self.role.and_then(|raw| raw.parse::<Role>().ok());
        let algorithm = self
            .algorithm
            .and_then(|raw| parse_algorithm(&raw).ok())
            .filter(|alg| matches!(alg, Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512));
        let private_key_file = self
            .private_key_file
            .filter(|path| !path.as_os_str().is_empty());

        match (user_id, role, private_key_file, algorithm) {
            (Some(user_id), Some(role), Some(private_key_file), Some(algorithm)) => {
                Ok(TokenRequest {
                    subject: TokenSubject::new(user_id, role),
                    private_key_file,
                    algorithm,
                })
            }
            _ => Err(CliError::HelpRequested),
        }
    }
}

/// Loads the key file under the fixed key id and signs a token for the subject.
pub fn generate_token(request: &TokenRequest) -> Result<String, CliError> {
    let keys = load_key(&request.private_key_file, request.algorithm)?;
    let token = TokenIssuer::new(Arc::new(keys)).issue(DEFAULT_KEY_ID, request.subject)?;
    Ok(token)
}

fn load_key(path: &Path, algorithm: Algorithm) -> Result<KeyStore, CliError> {
    let mut keys = KeyStore::new();
    keys.load_file(DEFAULT_KEY_ID, path, algorithm)?;
    Ok(keys)
}

pub fn format_token(token: &str) -> String {
    format!("-----BEGIN TOKEN-----\n{}\n-----END TOKEN-----\n", token)
}

/// Entry point used by the binary: prints usage or the delimited token.
pub fn run(args: GenTokenArgs) -> Result<String, CliError> {
    let request = match args.resolve() {
        Ok(request) => request,
        Err(err) => {
            println!("{}", USAGE);
            return Err(err);
        }
    };

    let token = generate_token(&request)?;
    print!("{}", format_token(&token));
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xs_auth::{AuthError, TokenVerifier};

    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../xs-auth/tests/fixtures/k1_pkcs1.pem"
    );

    #[test]
    fn test_missing_arguments_request_help() {
        let err = GenTokenArgs::default().resolve().unwrap_err();
        assert!(matches!(err, CliError::HelpRequested));
        assert_eq!(err.exit_code(), 0);

        let partial = GenTokenArgs {
            user_id: Some("1".to_string()),
            ..Default::default()
        };
        assert!(matches!(partial.resolve(), Err(CliError::HelpRequested)));
    }

    #[test]
    fn test_invalid_arguments_request_help() {
        for args in [
            GenTokenArgs::new("0", "ADMIN", FIXTURE, "RS256"),
            GenTokenArgs::new("abc", "ADMIN", FIXTURE, "RS256"),
            GenTokenArgs::new("1", "MANAGER", FIXTURE, "RS256"),
            GenTokenArgs::new("1", "ADMIN", "", "RS256"),
            GenTokenArgs::new("1", "ADMIN", FIXTURE, "HS256"),
            GenTokenArgs::new("1", "ADMIN", FIXTURE, "PS256"),
        ] {
            assert!(matches!(args.resolve(), Err(CliError::HelpRequested)));
        }
    }

    #[test]
    fn test_resolve_normalizes_role_and_algorithm() {
        let request = GenTokenArgs::new(" 42 ", "employee", FIXTURE, "rs384")
            .resolve()
            .unwrap();
        assert_eq!(request.subject, TokenSubject::new(42, Role::Employee));
        assert_eq!(request.algorithm, Algorithm::RS384);
    }

    #[test]
    fn test_generated_token_verifies_under_fixed_kid() {
        let request = GenTokenArgs::new("7", "ADMIN", FIXTURE, "RS256")
            .resolve()
            .unwrap();
        let token = generate_token(&request).unwrap();

        let keys = load_key(Path::new(FIXTURE), Algorithm::RS256).unwrap();
        let claims = TokenVerifier::new(Arc::new(keys)).verify(&token).unwrap();
        assert_eq!(claims.subject(), TokenSubject::new(7, Role::Admin));
        assert_eq!(
            jsonwebtoken::decode_header(&token).unwrap().kid.as_deref(),
            Some(DEFAULT_KEY_ID)
        );
    }

    #[test]
    fn test_missing_key_file_is_an_error_not_help() {
        let request = GenTokenArgs::new("7", "ADMIN", "/nonexistent/key.pem", "RS256")
            .resolve()
            .unwrap();
        let err = generate_token(&request).unwrap_err();
        assert!(matches!(err, CliError::Auth(AuthError::KeyFile { .. })));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_token_is_wrapped_in_delimiters() {
        assert_eq!(
            format_token("a.b.c"),
            "-----BEGIN TOKEN-----\na.b.c\n-----END TOKEN-----\n"
        );
    }
}
