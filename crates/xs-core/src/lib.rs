//! # xs-core
//!
//! Core types, errors, and utilities shared by every xs-website crate.
//!
//! - [`errors`]: [`AppError`], the HTTP-facing error type
//! - [`password`]: bcrypt password hashing and verification
//! - [`pagination`]: limit/offset/page query parameters and response metadata
//! - [`file_storage`]: content-addressed local storage for uploaded avatars
//!
//! # Example
//!
//! ```ignore
//! use xs_core::{AppError, hash_password, PaginationParams};
//!
//! let hash = hash_password("secret")?;
//! let params = PaginationParams::default();
//! assert_eq!(params.limit(), 10);
//! ```

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;

pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
