//! Dashboard route.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use scanpos_core::DashboardStats;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(stats))
}

async fn stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.dashboard.stats().await?))
}
