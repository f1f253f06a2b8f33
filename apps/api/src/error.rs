//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in ScanPOS                                │
//! │                                                                         │
//! │  Handler → Service → Result<T, ApiError>                               │
//! │                         │                                               │
//! │   CoreError ────────────┤  ValidationError, EmptyCart      → 400        │
//! │                         │  ProductNotFound                 → 404        │
//! │                         │  InvalidInvoiceStatus            → 409        │
//! │   DbError ──────────────┤  NotFound                        → 404        │
//! │                         │  UniqueViolation, Conflict       → 409        │
//! │                         │  Connection / Query / Internal   → 500        │
//! │   GatewayError ─────────┤  Unavailable / InvalidResponse   → 502        │
//! │                         │  Rejected                        → 400        │
//! │                         ▼                                               │
//! │   IntoResponse: { "error": "<code>", "message": "<text>" }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every conversion that hides detail from the client logs it first.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use scanpos_core::{CoreError, ValidationError};
use scanpos_db::DbError;
use scanpos_gateway::GatewayError;

/// Result type alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from every API operation.
///
/// ## Serialization
/// ```json
/// {
///   "error": "not_found",
///   "message": "Product not found: 5f0c…"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    #[serde(rename = "error")]
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Duplicate or stale state (409)
    Conflict,

    /// Gateway refused the payment proof (400)
    PaymentVerificationFailed,

    /// Bad or missing credentials (401)
    Unauthorized,

    /// Payment gateway or messaging provider failed (502)
    ExternalServiceError,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::PaymentVerificationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::ExternalServiceError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                let column = field.rsplit('.').next().unwrap_or(&field).to_string();
                warn!(field = %field, value = %value, "Unique constraint rejected write");
                ApiError::conflict(format!("{} '{}' already exists", column, value))
            }
            DbError::Conflict(message) => {
                warn!(%message, "Guarded write lost a race");
                ApiError::conflict(message)
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InvalidInvoiceStatus { .. } => ApiError::conflict(err.to_string()),
            CoreError::InvoiceNumberConflict { attempts } => {
                error!(attempts, "Invoice number allocation exhausted");
                ApiError::conflict(err.to_string())
            }
            CoreError::InvalidQuantity { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::AmountOverflow(_)
            | CoreError::EmptyCart => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed or mistyped request bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), "Rejected request body");
        ApiError::validation(rejection.body_text())
    }
}

/// Converts gateway errors to API errors.
impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected(reason) => {
                ApiError::new(ErrorCode::PaymentVerificationFailed, reason)
            }
            other => {
                error!(error = %other, "External service failed");
                ApiError::new(ErrorCode::ExternalServiceError, other.to_string())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
