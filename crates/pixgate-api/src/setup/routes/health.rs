//! Health check endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    storage: String,
}

/// Run an async check with a timeout; returns "healthy", "timeout", or
/// "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: std::future::Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

/// Overall service health: verifies the storage backend answers.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let storage_status = run_check(
        CHECK_TIMEOUT,
        async {
            state
                .storage
                .storage
                .exists("health-probe")
                .await
                .map(|_| ())
        },
        "error",
    )
    .await;

    let healthy = storage_status == "healthy";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            storage: storage_status,
        }),
    )
}

/// Liveness probe: the process is up and serving requests.
pub async fn liveness_check(_state: Arc<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe: the upload directory accepts writes.
pub async fn readiness_check(state: Arc<AppState>) -> impl IntoResponse {
    let probe_key = format!(".readiness-{}", uuid::Uuid::new_v4());
    let storage = state.storage.storage.clone();

    let storage_status = run_check(
        CHECK_TIMEOUT,
        async {
            storage.store(&probe_key, b"ok".to_vec()).await?;
            storage.delete(&probe_key).await
        },
        "not writable",
    )
    .await;

    let ready = storage_status == "healthy";
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "storage": storage_status,
        })),
    )
}
