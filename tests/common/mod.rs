#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;
use xs_website::router::init_router;
use xs_website::state::AppState;
use xs_website::xs_auth::{KeyStore, Role, TokenIssuer, TokenSubject};
use xs_website::xs_config::jwt::DEFAULT_KEY_ID;
use xs_website::xs_config::{CorsConfig, StorageConfig};
use xs_website::xs_core::hash_password;

pub const SEEDED_ADMIN_LOGIN: &str = "Admin";
pub const SEEDED_ADMIN_PASSWORD: &str = "1";

const TEST_KEY_PEM: &[u8] = include_bytes!("../../crates/xs-auth/tests/fixtures/k1_pkcs1.pem");
const OTHER_KEY_PEM: &[u8] = include_bytes!("../../crates/xs-auth/tests/fixtures/k2_pkcs8.pem");

pub const BOUNDARY: &str = "XS-TEST-BOUNDARY";

pub fn test_keys() -> Arc<KeyStore> {
    let mut keys = KeyStore::new();
    keys.load(DEFAULT_KEY_ID, TEST_KEY_PEM).unwrap();
    Arc::new(keys)
}

/// A key store that knows a different key, for forging tokens the server must reject.
pub fn foreign_keys(kid: &str) -> Arc<KeyStore> {
    let mut keys = KeyStore::new();
    keys.load(kid, OTHER_KEY_PEM).unwrap();
    Arc::new(keys)
}

pub fn test_storage_config() -> StorageConfig {
    StorageConfig {
        base_dir: std::env::temp_dir().join(format!("xs-website-test-{}", Uuid::new_v4())),
        base_url: "http://localhost:3000/files".to_string(),
        max_file_size: 1024 * 1024,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(
        pool,
        test_keys(),
        DEFAULT_KEY_ID,
        CorsConfig::parse("http://localhost:5173"),
        test_storage_config(),
    )
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool))
}

/// Router over a pool that never connects; enough for requests rejected before any query.
pub fn setup_offline_app() -> Router {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://xs:xs@127.0.0.1:1/unused")
        .unwrap();
    setup_test_app(pool)
}

pub fn token_for(user_id: i32, role: Role) -> String {
    TokenIssuer::new(test_keys())
        .issue(DEFAULT_KEY_ID, TokenSubject::new(user_id, role))
        .unwrap()
}

pub fn unique_login() -> String {
    format!("user-{}", Uuid::new_v4().simple())
}

pub async fn create_test_user(pool: &PgPool, login: &str, password: &str, role: Role) -> i32 {
    let hashed = hash_password(password).unwrap();
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO users (login, password, full_name, role, status)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING id
        "#,
    )
    .bind(login)
    .bind(hashed)
    .bind("Test User")
    .bind(role.as_str())
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn sign_in(app: Router, login: &str, password: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/sign-in")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "login": login, "password": password }).to_string(),
        ))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// A `multipart/form-data` body with text fields and an optional `avatar` file.
pub fn multipart_body(fields: &[(&str, &str)], avatar: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, data)) = avatar {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"avatar\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(method: &str, uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}
