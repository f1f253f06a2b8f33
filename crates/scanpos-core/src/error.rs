//! # Error Types
//!
//! Domain-specific error types for scanpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  scanpos-core errors (this file)                                       │
//! │  ├── CoreError        - Cart / invoice rule violations                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  scanpos-db errors        └── DbError       - Storage failures          │
//! │  scanpos-gateway errors   └── GatewayError  - Payment / messaging       │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What the frontend sees (JSON)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, invoice number, ...)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::types::InvoiceStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations in the invoice engine.
/// They are translated to HTTP responses by the API layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be resolved from the catalog.
    ///
    /// ## When This Occurs
    /// - Scanned barcode / submitted id does not exist
    /// - Product was deleted after being shown on screen
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Quantity change cannot be applied.
    ///
    /// ## When This Occurs
    /// - Negative delta for a product that is not in the cart
    #[error("Invalid quantity {delta} for product {product_id}")]
    InvalidQuantity { product_id: String, delta: i64 },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Cart has exceeded maximum allowed distinct items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// An invoice needs at least one line item.
    #[error("Cannot create an invoice from an empty cart")]
    EmptyCart,

    /// An amount left the representable range.
    ///
    /// ## When This Occurs
    /// - Catalog prices written outside `validate_price_cents`
    #[error("Amount out of range while computing {0}")]
    AmountOverflow(&'static str),

    /// Invoice is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Confirming payment on an already paid invoice
    /// - Cancelling an invoice that is already paid or cancelled
    #[error("Invoice {invoice_number} is {status}, cannot {operation}")]
    InvalidInvoiceStatus {
        invoice_number: String,
        status: InvoiceStatus,
        operation: &'static str,
    },

    /// No unused invoice number could be produced.
    ///
    /// ## When This Occurs
    /// - Every generated candidate already exists in the store
    #[error("Could not allocate a unique invoice number after {attempts} attempts")]
    InvoiceNumberConflict { attempts: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, non-numeric barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Client-side figure disagrees with the server computation.
    #[error("{field} does not match: expected {expected}, got {actual}")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidInvoiceStatus {
            invoice_number: "INV-1700000000000".to_string(),
            status: InvoiceStatus::Paid,
            operation: "cancel",
        };
        assert_eq!(
            err.to_string(),
            "Invoice INV-1700000000000 is paid, cannot cancel"
        );

        assert_eq!(
            CoreError::EmptyCart.to_string(),
            "Cannot create an invoice from an empty cart"
        );
        assert_eq!(
            CoreError::AmountOverflow("line subtotal").to_string(),
            "Amount out of range while computing line subtotal"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customerPhone".to_string(),
        };
        assert_eq!(err.to_string(), "customerPhone is required");

        let err = ValidationError::Mismatch {
            field: "total".to_string(),
            expected: "2478.00".to_string(),
            actual: "2400.00".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "total does not match: expected 2478.00, got 2400.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
