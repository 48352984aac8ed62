//! # xs-config
//!
//! Configuration structures loaded from environment variables. Every struct
//! has a `from_env()` constructor that falls back to development defaults,
//! except for values the server cannot run without (`DATABASE_URL`).
//!
//! - [`jwt`]: signing key location, key identifier and algorithm
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: bind address and startup behaviour
//! - [`cors`]: allowed origins
//! - [`storage`]: upload directory and public URL prefix
//!
//! ```ignore
//! use xs_config::{JwtConfig, ServerConfig};
//!
//! dotenvy::dotenv().ok();
//! let jwt = JwtConfig::from_env();
//! let server = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;
pub mod storage;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
