//! HTTP routes.
//!
//! ```text
//! /invoice/generate          POST
//! /invoice/verify-payment    POST
//! /invoice/cancel            POST
//! /invoices                  GET      ?status=
//! /invoices/{invoiceNumber}  GET
//! /inventory                 GET POST
//! /inventory/{id}            GET PUT DELETE
//! /inventory/barcode/{code}  GET
//! /customers                 GET POST
//! /customers/{id}            GET PUT
//! /dashboard/stats           GET
//! /auth/register             POST
//! /auth/login                POST
//! /health                    GET
//! ```

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod invoice;

/// Every route, with state still to be provided.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(invoice::router())
        .merge(inventory::router())
        .merge(customer::router())
        .merge(dashboard::router())
        .merge(auth::router())
        .merge(health::router())
}
