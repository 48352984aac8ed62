use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;
use xs_auth::{TokenIssuer, TokenSubject};
use xs_core::{AppError, verify_password};
use xs_models::{SignInRequest, SignInResponse, SignInUser, User};

use crate::metrics::track_sign_in;

const INVALID_CREDENTIALS: &str = "Invalid login or password";

pub struct AuthService;

impl AuthService {
    /// Checks the credentials of a live user and issues a token under `key_id`.
    #[instrument(skip(db, issuer, dto), fields(login = %dto.login))]
    pub async fn sign_in(
        db: &PgPool,
        issuer: &TokenIssuer,
        key_id: &str,
        dto: SignInRequest,
    ) -> Result<SignInResponse, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE login = $1 AND deleted_at IS NULL",
        )
        .bind(&dto.login)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by login")
        .map_err(AppError::database)?;

        let Some(user) = user else {
            track_sign_in(false);
            return Err(AppError::unauthorized(anyhow!(INVALID_CREDENTIALS)));
        };

        if !verify_password(&dto.password, &user.password)? {
            track_sign_in(false);
            tracing::warn!(user_id = user.id, "sign-in with wrong password");
            return Err(AppError::unauthorized(anyhow!(INVALID_CREDENTIALS)));
        }

        let role = user
            .role()
            .with_context(|| format!("User {} has an unknown stored role", user.id))
            .map_err(AppError::internal)?;

        let token = issuer.issue(key_id, TokenSubject::new(user.id, role))?;

        track_sign_in(true);
        tracing::info!(user_id = user.id, role = %role, "user signed in");

        Ok(SignInResponse {
            token,
            user: SignInUser {
                id: user.id,
                login: user.login,
                full_name: user.full_name,
                role,
            },
        })
    }
}
