//! # ScanPOS API
//!
//! HTTP surface of the ScanPOS invoice engine.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ScanPOS API                                    │
//! │                                                                         │
//! │  client ──► TraceLayer ──► routes/* ──► services/* ──► Arc<dyn Store>  │
//! │                                              │                          │
//! │                                              ├──► PaymentGateway        │
//! │                                              └──► NotificationDispatcher│
//! │                                                                         │
//! │  Every failure leaves as { "error": "<code>", "message": "<text>" }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the application router with request tracing.
pub fn build_app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
