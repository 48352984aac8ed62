//! Prometheus metrics: HTTP traffic plus sign-in, token and user counters.
//!
//! Everything here is a no-op when `OBSERVABILITY_ENABLED` is `false` or `0`.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{Unit, counter, describe_counter, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const HTTP_DURATION: &str = "http_request_duration_seconds";
const HTTP_DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0"))
            .unwrap_or(true)
    })
}

fn describe_metrics() {
    describe_counter!("http_requests_total", "HTTP requests by method, route and status");
    describe_histogram!(HTTP_DURATION, Unit::Seconds, "HTTP request latency");
    describe_counter!("sign_ins_total", "Sign-in attempts by outcome");
    describe_counter!("tokens_rejected_total", "Bearer tokens rejected, by reason");
    describe_counter!("users_created_total", "Users created through the API, by role");
}

/// Installs the Prometheus recorder. Returns `None` when observability is off.
pub fn init_metrics() -> anyhow::Result<Option<PrometheusHandle>> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(HTTP_DURATION.to_string()), HTTP_DURATION_BUCKETS)?
        .install_recorder()?;
    describe_metrics();

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            interval.tick().await;
            upkeep.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Labels by route template (`/api/v1/user/{id}`), never by raw path, so ids
/// do not explode the label space.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    gauge!("http_requests_in_flight").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_in_flight").decrement(1.0);

    let status = response.status().as_u16().to_string();
    histogram!(HTTP_DURATION, "method" => method.clone(), "route" => route.clone())
        .record(start.elapsed().as_secs_f64());
    counter!("http_requests_total", "method" => method, "route" => route, "status" => status)
        .increment(1);

    response
}

/// Serves the exposition format at `/metrics`.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_sign_in(success: bool) {
    if is_observability_enabled() {
        let outcome = if success { "success" } else { "failure" };
        counter!("sign_ins_total", "status" => outcome).increment(1);
    }
}

/// `reason` is an [`xs_auth::AuthError::kind`] label.
pub fn track_token_rejected(reason: &'static str) {
    if is_observability_enabled() {
        counter!("tokens_rejected_total", "reason" => reason).increment(1);
    }
}

pub fn track_user_created(role: &'static str) {
    if is_observability_enabled() {
        counter!("users_created_total", "role" => role).increment(1);
    }
}
