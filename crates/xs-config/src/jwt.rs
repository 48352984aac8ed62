use std::env;
use std::path::PathBuf;

/// Key identifier the bundled private key is registered under.
pub const DEFAULT_KEY_ID: &str = "54bb2165-71e1-41a6-af3e-7da4a0e1e2c1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtConfig {
    /// PEM file holding the RSA private key (PKCS#1 or PKCS#8)
    pub private_key_path: PathBuf,
    /// Identifier written to the `kid` header of issued tokens
    pub key_id: String,
    /// One of RS256, RS384, RS512
    pub algorithm: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            private_key_path: PathBuf::from("keys/private.pem"),
            key_id: DEFAULT_KEY_ID.to_string(),
            algorithm: "RS256".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            private_key_path: env::var("JWT_PRIVATE_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.private_key_path),
            key_id: env::var("JWT_KEY_ID").unwrap_or(defaults.key_id),
            algorithm: env::var("JWT_ALGORITHM")
                .map(|a| a.trim().to_uppercase())
                .unwrap_or(defaults.algorithm),
        }
    }
}
