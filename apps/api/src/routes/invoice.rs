//! Invoice routes: generate, verify payment, cancel, history.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use scanpos_core::{Customer, Invoice};
use scanpos_gateway::{NotificationReceipt, PaymentOrder};

use crate::error::{ApiResult, ErrorCode};
use crate::services::invoice_service::{
    GenerateInvoiceRequest, PaymentOutcome, VerifyPaymentRequest,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoice/generate", post(generate))
        .route("/invoice/verify-payment", post(verify_payment))
        .route("/invoice/cancel", post(cancel))
        .route("/invoices", get(list))
        .route("/invoices/{invoice_number}", get(get_invoice))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    success: bool,
    invoice: Invoice,
    payment_order: PaymentOrder,
}

#[derive(Debug, Serialize)]
struct ConfirmedResponse {
    success: bool,
    invoice: Invoice,
    customer: Customer,
    notifications: Vec<NotificationReceipt>,
}

#[derive(Debug, Serialize)]
struct RejectedResponse {
    success: bool,
    error: ErrorCode,
    message: String,
    invoice: Invoice,
}

#[derive(Debug, Serialize)]
struct InvoiceResponse {
    invoice: Invoice,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelRequest {
    #[serde(default)]
    invoice_number: String,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateInvoiceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GenerateResponse>)> {
    let Json(request) = payload?;
    let generated = state.invoices.generate(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            success: true,
            invoice: generated.invoice,
            payment_order: generated.payment_order,
        }),
    ))
}

async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;

    let response = match state.invoices.confirm_payment(request).await? {
        PaymentOutcome::Confirmed {
            invoice,
            customer,
            notifications,
        } => Json(ConfirmedResponse {
            success: true,
            invoice,
            customer,
            notifications,
        })
        .into_response(),
        PaymentOutcome::Rejected { invoice, reason } => {
            let code = ErrorCode::PaymentVerificationFailed;
            (
                code.status(),
                Json(RejectedResponse {
                    success: false,
                    error: code,
                    message: reason,
                    invoice,
                }),
            )
                .into_response()
        }
    };

    Ok(response)
}

async fn cancel(
    State(state): State<AppState>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> ApiResult<Json<InvoiceResponse>> {
    let Json(request) = payload?;
    let invoice = state.invoices.cancel(request.invoice_number.trim()).await?;
    Ok(Json(InvoiceResponse { invoice }))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Invoice>>> {
    Ok(Json(state.invoices.list(query.status.as_deref()).await?))
}

async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_number): Path<String>,
) -> ApiResult<Json<Invoice>> {
    Ok(Json(state.invoices.get(&invoice_number).await?))
}
