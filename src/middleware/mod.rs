//! Request authentication and role gating.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the token and exposes its claims
//! 3. [`role::require_admin`] (route layer) or [`role::RequireAdmin`]
//!    (extractor) applies the role gate before the handler runs
//!
//! Both stages fail with a generic 401/403 body; the reason is only logged.

pub mod auth;
pub mod role;
