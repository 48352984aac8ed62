//! # xs-auth
//!
//! Token-based authentication for the xs-website API.
//!
//! - [`keys`]: [`KeyStore`], RSA signing keys addressed by key identifier (`kid`)
//! - [`issuer`]: [`TokenIssuer`], produces signed tokens with fixed policy claims
//! - [`verifier`]: [`TokenVerifier`], resolves the key, checks signature and validity window
//! - [`gate`]: [`authorize`], exact-match role check run before business logic
//! - [`claims`] / [`roles`]: the payload carried by every token
//! - [`error`]: [`AuthError`] and its mapping onto HTTP responses
//!
//! # Request lifecycle
//!
//! ```text
//! Unauthenticated -> TokenPresented -> Verified -> Authorized
//!                                   \-> Rejected  \-> Forbidden
//! ```
//!
//! A rejected or forbidden request is final; the client has to obtain a new
//! token out of band.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xs_auth::{KeyStore, Role, TokenIssuer, TokenSubject, TokenVerifier, ensure_role};
//!
//! let mut keys = KeyStore::new();
//! keys.load("k1", &std::fs::read("keys/private.pem")?)?;
//! let keys = Arc::new(keys);
//!
//! let token = TokenIssuer::new(keys.clone()).issue("k1", TokenSubject::new(7, Role::Admin))?;
//! let claims = TokenVerifier::new(keys).verify(&token)?;
//! ensure_role(&claims, Role::Admin)?;
//! ```

pub mod claims;
pub mod error;
pub mod gate;
pub mod issuer;
pub mod keys;
pub mod roles;
pub mod verifier;

pub use claims::{Claims, TokenSubject};
pub use error::{AuthError, AuthResult};
pub use gate::{Decision, authorize, ensure_role};
pub use issuer::{TOKEN_ISSUER, TOKEN_LIFETIME_HOURS, TokenIssuer};
pub use keys::{KeyStore, PublicKey, parse_algorithm};
pub use roles::Role;
pub use verifier::TokenVerifier;
