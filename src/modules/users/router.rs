use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use super::controller::{
    create_user, delete_user, get_me, get_user, get_users, patch_user, update_user,
};
use crate::middleware::role::require_admin;
use crate::state::AppState;

/// Headroom above the avatar size limit for the text parts of the form.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// `/me` is open to any verified role; everything else is admin-only.
pub fn init_users_router(state: &AppState) -> Router<AppState> {
    let body_limit = state.storage_config.max_file_size + FORM_OVERHEAD_BYTES;

    let admin = Router::new()
        .route("/list", get(get_users))
        .route("/create", post(create_user))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new().route("/me", get(get_me)).merge(admin)
}
