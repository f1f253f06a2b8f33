//! # Validation Module
//!
//! Input validation utilities for ScanPOS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web Frontend (TypeScript)                                    │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE constraints (barcode, phone, invoice_number, email)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use scanpos_core::validation::{validate_phone, validate_quantity};
//!
//! assert!(validate_phone("+91 98765 43210").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::CustomerInfo;
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, customer or user).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Optional leading `+`, then digits; spaces and hyphens are ignored
/// - 7 to 15 digits (E.164 upper bound)
///
/// ## Returns
/// The trimmed phone number as entered.
///
/// ## Example
/// ```rust
/// use scanpos_core::validation::validate_phone;
///
/// assert!(validate_phone("9876543210").is_ok());
/// assert!(validate_phone("").is_err());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let mut digits = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "phone".to_string(),
                    reason: "must contain only digits".to_string(),
                })
            }
        }
    }

    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 7 and 15 digits".to_string(),
        });
    }

    Ok(phone.to_string())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot and no empty labels
/// - No whitespace
///
/// ## Returns
/// The trimmed, lowercased address.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(invalid());
    }

    Ok(email.to_ascii_lowercase())
}

/// Treats a blank optional email as absent, validates it otherwise.
pub fn validate_optional_email(email: Option<&str>) -> ValidationResult<Option<String>> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(email) => validate_email(email).map(Some),
    }
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - Letters and digits only (covers EAN/UPC and Code 128 labels)
/// - At most 64 characters
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(barcode.to_string())
}

/// Validates a login password on registration.
///
/// ## Rules
/// - At least 6 characters, at most 128
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if !(6..=128).contains(&len) {
        return Err(ValidationError::OutOfRange {
            field: "password length".to_string(),
            min: 6,
            max: 128,
        });
    }

    Ok(())
}

/// Validates and normalizes checkout customer details.
///
/// ## Example
/// ```rust
/// use scanpos_core::validation::validate_customer_info;
///
/// let info = validate_customer_info(" Asha ", "9876543210", Some("")).unwrap();
/// assert_eq!(info.name, "Asha");
/// assert_eq!(info.email, None);
/// ```
pub fn validate_customer_info(
    name: &str,
    phone: &str,
    email: Option<&str>,
) -> ValidationResult<CustomerInfo> {
    Ok(CustomerInfo {
        name: validate_name("customerName", name)?,
        phone: validate_phone(phone)?,
        email: validate_optional_email(email)?,
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Invoice: Add Item                                                      │
/// │                                                                         │
/// │  Cashier enters quantity: 5                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → Proceed with add_or_update_line_item                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in paise.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - Must not exceed MAX_PRICE_CENTS (₹1,00,00,000)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a GST rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
/// - Indian GST slabs are 0, 500, 1200, 1800 and 2800
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "gst".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a stock count or threshold.
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "  Mouse ").unwrap(), "Mouse");
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("+91 98765-43210").is_ok());

        assert!(matches!(
            validate_phone("  "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98765x3210").is_err());
        assert!(validate_phone("+").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(" Asha@Example.com ").unwrap(),
            "asha@example.com"
        );
        assert!(validate_email("asha@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn test_validate_optional_email() {
        assert_eq!(validate_optional_email(None).unwrap(), None);
        assert_eq!(validate_optional_email(Some("  ")).unwrap(), None);
        assert!(validate_optional_email(Some("nope")).is_err());
    }

    #[test]
    fn test_validate_customer_info_rejects_empty_phone() {
        let err = validate_customer_info("Asha", "", None).unwrap_err();
        assert!(matches!(err, ValidationError::Required { field } if field == "phone"));
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("0000000000042").is_ok());
        assert!(validate_barcode("ABC123").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("12 34").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("abc").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_numeric_fields() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(10_000_000_000_000_000).is_err());

        assert!(validate_tax_rate_bps(1800).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());

        assert!(validate_stock_level("stock", 0).is_ok());
        assert!(validate_stock_level("stock", -1).is_err());
    }
}
