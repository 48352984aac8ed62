//! Signing key registry.
//!
//! Keys are RSA private keys in PEM form (PKCS#1 or PKCS#8), registered under
//! a key identifier that is written into each token header. The store is
//! built once at startup and shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rsa::RsaPrivateKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::pkcs8::DecodePrivateKey;

use crate::error::{AuthError, AuthResult};

/// RSA family only; HMAC and EC keys are not accepted.
pub fn parse_algorithm(name: &str) -> AuthResult<Algorithm> {
    let normalized = name.trim().to_ascii_uppercase();
    match Algorithm::from_str(&normalized) {
        Ok(
            alg @ (Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512),
        ) => Ok(alg),
        _ => Err(AuthError::UnsupportedAlgorithm(name.to_string())),
    }
}

pub(crate) struct SigningKey {
    pub(crate) algorithm: Algorithm,
    pub(crate) encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Verification half of a registered key.
#[derive(Clone, Copy)]
pub struct PublicKey<'a> {
    pub algorithm: Algorithm,
    pub decoding: &'a DecodingKey,
}

#[derive(Debug, Default)]
pub struct KeyStore {
    keys: HashMap<String, SigningKey>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an RS256 key.
    pub fn load(&mut self, kid: &str, pem: &[u8]) -> AuthResult<()> {
        self.load_with_algorithm(kid, pem, Algorithm::RS256)
    }

    pub fn load_with_algorithm(
        &mut self,
        kid: &str,
        pem: &[u8],
        algorithm: Algorithm,
    ) -> AuthResult<()> {
        let key = parse_signing_key(kid, pem, algorithm)?;
        self.keys.insert(kid.to_string(), key);
        tracing::debug!(kid = %kid, ?algorithm, "registered signing key");
        Ok(())
    }

    /// Reads the PEM file once; the file handle is released before parsing.
    pub fn load_file(&mut self, kid: &str, path: &Path, algorithm: Algorithm) -> AuthResult<()> {
        let pem = std::fs::read(path).map_err(|e| AuthError::KeyFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.load_with_algorithm(kid, &pem, algorithm)
    }

    pub fn resolve_public(&self, kid: &str) -> AuthResult<PublicKey<'_>> {
        self.keys
            .get(kid)
            .map(|key| PublicKey {
                algorithm: key.algorithm,
                decoding: &key.decoding,
            })
            .ok_or_else(|| AuthError::NotFound(kid.to_string()))
    }

    pub(crate) fn signing_key(&self, kid: &str) -> AuthResult<&SigningKey> {
        self.keys
            .get(kid)
            .ok_or_else(|| AuthError::NotFound(kid.to_string()))
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}

fn parse_signing_key(kid: &str, pem: &[u8], algorithm: Algorithm) -> AuthResult<SigningKey> {
    let format_error = |reason: String| AuthError::KeyFormat {
        kid: kid.to_string(),
        reason,
    };

    let text = std::str::from_utf8(pem).map_err(|_| format_error("PEM is not UTF-8".into()))?;
    let private = RsaPrivateKey::from_pkcs1_pem(text)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(text))
        .map_err(|e| format_error(e.to_string()))?;
    private.validate().map_err(|e| format_error(e.to_string()))?;

    let public_pem = private
        .to_public_key()
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| format_error(e.to_string()))?;

    let encoding = EncodingKey::from_rsa_pem(pem).map_err(|e| format_error(e.to_string()))?;
    let decoding = DecodingKey::from_rsa_pem(public_pem.as_bytes())
        .map_err(|e| format_error(e.to_string()))?;

    Ok(SigningKey {
        algorithm,
        encoding,
        decoding,
    })
}
