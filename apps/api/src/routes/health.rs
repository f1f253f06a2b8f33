//! Health check.
//!
//! Reports process liveness plus a database round-trip. A failed store
//! check answers 503.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    version: &'static str,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.dashboard.store_healthy().await;
    if !healthy {
        warn!("Health check: store unreachable");
    }

    let (status, body) = if healthy {
        (StatusCode::OK, ("ok", "ok"))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ("degraded", "unreachable"))
    };

    (
        status,
        Json(HealthResponse {
            status: body.0,
            database: body.1,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
