//! Customer routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use scanpos_core::Customer;

use crate::error::ApiResult;
use crate::services::customer_service::CustomerInput;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route("/customers/{id}", get(get_customer).put(update))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.customers.list().await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let Json(input) = payload?;
    Ok((StatusCode::CREATED, Json(state.customers.create(input).await?)))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.customers.get(&id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> ApiResult<Json<Customer>> {
    let Json(input) = payload?;
    Ok(Json(state.customers.update(&id, input).await?))
}
