//! PostgreSQL connection settings.
//!
//! - `DATABASE_URL`: connection string (required by the server and `xs-cli migrate`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)

use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Returns `None` when `DATABASE_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = env::var("DATABASE_URL").ok()?;
        Some(Self {
            url,
            max_connections: crate::env_or("DATABASE_MAX_CONNECTIONS", 10),
        })
    }
}
