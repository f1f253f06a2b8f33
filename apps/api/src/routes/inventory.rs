//! Inventory routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiResult;
use crate::services::inventory_service::{ProductInput, ProductView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list).post(create))
        .route(
            "/inventory/{id}",
            get(get_product).put(update).delete(delete),
        )
        .route("/inventory/barcode/{barcode}", get(by_barcode))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductView>>> {
    Ok(Json(state.inventory.list().await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductView>)> {
    let Json(input) = payload?;
    let product = state.inventory.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductView>> {
    Ok(Json(state.inventory.get(&id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<ProductView>> {
    let Json(input) = payload?;
    Ok(Json(state.inventory.update(&id, input).await?))
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.inventory.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<ProductView>> {
    Ok(Json(state.inventory.by_barcode(&barcode).await?))
}
