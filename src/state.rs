use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use xs_auth::{KeyStore, TokenIssuer, TokenVerifier, parse_algorithm};
use xs_config::{CorsConfig, DatabaseConfig, JwtConfig, StorageConfig};
use xs_core::{FileStorage, LocalFileStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
    /// Key identifier used when issuing sign-in tokens
    pub key_id: String,
    pub cors_config: CorsConfig,
    pub storage_config: StorageConfig,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Assembles state from already-loaded parts. Both the issuer and the
    /// verifier share the same read-only key store.
    pub fn new(
        db: PgPool,
        keys: Arc<KeyStore>,
        key_id: impl Into<String>,
        cors_config: CorsConfig,
        storage_config: StorageConfig,
    ) -> Self {
        let storage = LocalFileStorage::with_max_size(
            storage_config.base_dir.clone(),
            storage_config.base_url.clone(),
            storage_config.max_file_size,
        );
        Self {
            db,
            issuer: TokenIssuer::new(keys.clone()),
            verifier: TokenVerifier::new(keys),
            key_id: key_id.into(),
            cors_config,
            storage_config,
            storage: Arc::new(storage),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("key_id", &self.key_id)
            .field("cors_config", &self.cors_config)
            .field("storage_config", &self.storage_config)
            .finish_non_exhaustive()
    }
}

/// Loads the signing key once at startup.
pub fn load_key_store(config: &JwtConfig) -> anyhow::Result<KeyStore> {
    let algorithm = parse_algorithm(&config.algorithm)?;
    let mut keys = KeyStore::new();
    keys.load_file(&config.key_id, &config.private_key_path, algorithm)
        .with_context(|| {
            format!(
                "Failed to load JWT signing key from {}",
                config.private_key_path.display()
            )
        })?;
    Ok(keys)
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env();
    let keys = load_key_store(&jwt_config)?;

    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let db = xs_db::init_db_pool(&db_config).await?;

    tracing::info!(kid = %jwt_config.key_id, algorithm = %jwt_config.algorithm, "signing key loaded");

    Ok(AppState::new(
        db,
        Arc::new(keys),
        jwt_config.key_id,
        CorsConfig::from_env(),
        StorageConfig::from_env(),
    ))
}
