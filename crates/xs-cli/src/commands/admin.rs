use sqlx::PgPool;
use xs_auth::Role;
use xs_core::hash_password;

use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub login: String,
    pub password: String,
    pub full_name: Option<String>,
}

impl NewAdmin {
    fn validate(&self) -> Result<(), CliError> {
        if self.login.trim().is_empty() {
            return Err(CliError::EmptyField("login"));
        }
        if self.password.is_empty() {
            return Err(CliError::EmptyField("password"));
        }
        Ok(())
    }
}

/// Inserts an ADMIN account and returns its id. Fails if a live user already has the login.
pub async fn create_admin(pool: &PgPool, admin: &NewAdmin) -> Result<i32, CliError> {
    admin.validate()?;
    let login = admin.login.trim();

    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE login = $1 AND deleted_at IS NULL)",
    )
    .bind(login)
    .fetch_one(pool)
    .await?;

    if taken {
        return Err(CliError::LoginTaken(login.to_string()));
    }

    let hashed = hash_password(&admin.password).map_err(|e| CliError::Hashing(e.to_string()))?;

    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO users (login, password, full_name, role, status)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING id
        "#,
    )
    .bind(login)
    .bind(&hashed)
    .bind(admin.full_name.as_deref().filter(|n| !n.trim().is_empty()))
    .bind(Role::Admin.as_str())
    .fetch_one(pool)
    .await?;

    Ok(id)
}
