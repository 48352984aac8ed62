//! # xs-cli
//!
//! Administrative commands for the xs-website backend.
//!
//! - `gentoken`: sign a long-lived token out of band
//! - `migrate`: apply pending schema migrations
//! - `create-admin`: insert an ADMIN account
//!
//! ```ignore
//! use xs_cli::commands::gentoken::{GenTokenArgs, generate_token};
//!
//! let request = GenTokenArgs::new("1", "ADMIN", "keys/private.pem", "RS256").resolve()?;
//! let token = generate_token(&request)?;
//! ```

pub mod commands;
pub mod error;

pub use error::CliError;
