use anyhow::{Context, anyhow};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use xs_auth::Role;
use xs_core::{AppError, FileStorage, PaginationMeta, hash_password};
use xs_models::{
    AvatarUpload, CreateUserDto, MeResponse, PaginatedUsersResponse, PatchUserDto, UpdateUserDto,
    User, UserFilterParams, UserResponse,
};

use crate::metrics::track_user_created;

const AVATAR_PREFIX: &str = "users";
const UNIQUE_VIOLATION: &str = "23505";

fn user_not_found() -> AppError {
    AppError::not_found(anyhow!("User not found"))
}

fn login_taken() -> AppError {
    AppError::conflict(anyhow!("Login is already in use"))
}

/// Turns a unique-index race on `login` into the same 409 as the explicit check.
fn map_write_error(err: sqlx::Error, action: &'static str) -> AppError {
    let is_unique_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);
    if is_unique_violation {
        return login_taken();
    }
    AppError::database(anyhow::Error::new(err).context(action))
}

/// Appends the list filters shared by the page query and the count query.
fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    role: Option<Role>,
    search: Option<String>,
) {
    builder.push(" WHERE deleted_at IS NULL");
    if let Some(role) = role {
        builder.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(pattern) = search {
        builder.push(" AND full_name ILIKE ").push_bind(pattern);
    }
}

pub struct UserService;

impl UserService {
    pub fn to_response(user: User, storage: &dyn FileStorage) -> Result<UserResponse, AppError> {
        let role = user
            .role()
            .with_context(|| format!("User {} has an unknown stored role", user.id))
            .map_err(AppError::internal)?;
        let avatar = user
            .avatar
            .as_deref()
            .map(|key| storage.get_url(key))
            .transpose()?;

        Ok(UserResponse {
            id: user.id,
            login: user.login,
            full_name: user.full_name,
            avatar,
            role,
            status: user.status.unwrap_or(false),
            phone: user.phone,
            created_at: user.created_at,
        })
    }

    async fn ensure_login_available(
        db: &PgPool,
        login: &str,
        except_id: Option<i32>,
    ) -> Result<(), AppError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE login = $1 AND deleted_at IS NULL AND ($2::INT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(login)
        .bind(except_id)
        .fetch_one(db)
        .await
        .context("Failed to check login uniqueness")
        .map_err(AppError::database)?;

        if taken {
            return Err(login_taken());
        }
        Ok(())
    }

    async fn find_live(db: &PgPool, id: i32) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user")
            .map_err(AppError::database)?
            .ok_or_else(user_not_found)
    }

    async fn store_avatar(
        storage: &dyn FileStorage,
        avatar: Option<&AvatarUpload>,
    ) -> Result<Option<String>, AppError> {
        match avatar {
            Some(upload) => {
                let key = storage
                    .save_image(AVATAR_PREFIX, &upload.content_type, &upload.data)
                    .await?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(db, storage))]
    pub async fn list_users(
        db: &PgPool,
        storage: &dyn FileStorage,
        filter: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let role = filter.role_filter()?;
        let search = filter.search_pattern();
        let limit = filter.pagination.limit();
        let offset = filter.pagination.offset();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_query, role, search.clone());
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(db)
            .await
            .context("Failed to count users")
            .map_err(AppError::database)?;

        let mut page_query = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filters(&mut page_query, role, search);
        page_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let users = page_query
            .build_query_as::<User>()
            .fetch_all(db)
            .await
            .context("Failed to fetch users")
            .map_err(AppError::database)?;

        let data = users
            .into_iter()
            .map(|user| Self::to_response(user, storage))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedUsersResponse {
            data,
            meta: PaginationMeta::new(&filter.pagination, total),
        })
    }

    #[instrument(skip(db, storage))]
    pub async fn get_user(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: i32,
    ) -> Result<UserResponse, AppError> {
        let user = Self::find_live(db, id).await?;
        Self::to_response(user, storage)
    }

    #[instrument(skip(db, storage, dto, avatar), fields(login = %dto.login))]
    pub async fn create_user(
        db: &PgPool,
        storage: &dyn FileStorage,
        actor_id: i32,
        dto: CreateUserDto,
        avatar: Option<AvatarUpload>,
    ) -> Result<UserResponse, AppError> {
        let role: Role = dto.role.parse()?;
        Self::ensure_login_available(db, &dto.login, None).await?;

        let hashed = hash_password(&dto.password)?;
        // A login race lost at the insert leaves the stored file behind. Keys are
        // content-addressed, so a retry with the same upload reuses it.
        let avatar_key = Self::store_avatar(storage, avatar.as_ref()).await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password, full_name, avatar, role, phone, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&dto.login)
        .bind(&hashed)
        .bind(&dto.full_name)
        .bind(&avatar_key)
        .bind(role.as_str())
        .bind(&dto.phone)
        .bind(actor_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, "Failed to insert user"))?;

        track_user_created(role.as_str());
        tracing::info!(user_id = user.id, role = %role, "user created");

        Self::to_response(user, storage)
    }

    /// Replaces every editable column. A missing avatar clears the stored one.
    #[instrument(skip(db, storage, dto, avatar))]
    pub async fn update_user(
        db: &PgPool,
        storage: &dyn FileStorage,
        actor_id: i32,
        id: i32,
        dto: UpdateUserDto,
        avatar: Option<AvatarUpload>,
    ) -> Result<(), AppError> {
        let role: Role = dto.role.parse()?;
        Self::find_live(db, id).await?;
        Self::ensure_login_available(db, &dto.login, Some(id)).await?;

        let hashed = hash_password(&dto.password)?;
        let avatar_key = Self::store_avatar(storage, avatar.as_ref()).await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET login = $1, full_name = $2, phone = $3, avatar = $4, password = $5, role = $6,
                updated_at = NOW(), updated_by = $7
            WHERE id = $8 AND deleted_at IS NULL
            "#,
        )
        .bind(&dto.login)
        .bind(&dto.full_name)
        .bind(&dto.phone)
        .bind(&avatar_key)
        .bind(&hashed)
        .bind(role.as_str())
        .bind(actor_id)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, "Failed to update user"))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    /// Writes only the provided columns; `updated_at`/`updated_by` are always set.
    #[instrument(skip(db, storage, dto, avatar))]
    pub async fn patch_user(
        db: &PgPool,
        storage: &dyn FileStorage,
        actor_id: i32,
        id: i32,
        dto: PatchUserDto,
        avatar: Option<AvatarUpload>,
    ) -> Result<(), AppError> {
        let role = dto.role.as_deref().map(str::parse::<Role>).transpose()?;
        Self::find_live(db, id).await?;
        if let Some(login) = &dto.login {
            Self::ensure_login_available(db, login, Some(id)).await?;
        }
        let hashed = dto.password.as_deref().map(hash_password).transpose()?;
        let avatar_key = Self::store_avatar(storage, avatar.as_ref()).await?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut set = query.separated(", ");
        if let Some(login) = dto.login {
            set.push("login = ").push_bind_unseparated(login);
        }
        if let Some(full_name) = dto.full_name {
            set.push("full_name = ").push_bind_unseparated(full_name);
        }
        if let Some(phone) = dto.phone {
            set.push("phone = ").push_bind_unseparated(phone);
        }
        if let Some(key) = avatar_key {
            set.push("avatar = ").push_bind_unseparated(key);
        }
        if let Some(hashed) = hashed {
            set.push("password = ").push_bind_unseparated(hashed);
        }
        if let Some(role) = role {
            set.push("role = ").push_bind_unseparated(role.as_str());
        }
        set.push("updated_at = NOW()");
        set.push("updated_by = ").push_bind_unseparated(actor_id);
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL");

        let result = query
            .build()
            .execute(db)
            .await
            .map_err(|e| map_write_error(e, "Failed to patch user"))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    /// Soft delete: the row stays, marked with `deleted_at`/`deleted_by`.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, actor_id: i32, id: i32) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW(), deleted_by = $1
            WHERE id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(actor_id)
        .bind(id)
        .execute(db)
        .await
        .context("Failed to delete user")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }

        tracing::info!(user_id = id, deleted_by = actor_id, "user soft-deleted");
        Ok(())
    }

    #[instrument(skip(db, storage))]
    pub async fn get_me(
        db: &PgPool,
        storage: &dyn FileStorage,
        user_id: i32,
    ) -> Result<MeResponse, AppError> {
        let user = Self::find_live(db, user_id).await?;
        let avatar = user
            .avatar
            .as_deref()
            .map(|key| storage.get_url(key))
            .transpose()?;

        Ok(MeResponse {
            id: user.id,
            login: user.login,
            avatar,
            full_name: user.full_name,
            phone: user.phone,
        })
    }
}
