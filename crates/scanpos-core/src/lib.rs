//! # scanpos-core: Pure Business Logic for ScanPOS
//!
//! This crate is the **heart** of ScanPOS. It contains the invoice engine and
//! every business rule as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanPOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Scan/Search ──► Cart ──► Invoice ──► QR Payment ──► Share    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /invoice/generate, /invoice/verify-payment, /inventory ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ scanpos-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ invoice  │ │customer│  │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │ finalize │ │ upsert │  │   │
//! │  │   │ Invoice │ │ TaxRate │ │ totals  │ │ status   │ │  plan  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           scanpos-db / scanpos-gateway (I/O layers)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, Customer, User, ...)
//! - [`money`] - Money, TaxRate and exact tax accumulation
//! - [`cart`] - Cart, line items and invoice totals
//! - [`invoice`] - Invoice finalization, numbering and status transitions
//! - [`customer`] - Customer upsert planning on payment
//! - [`barcode`] - Barcode generation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (paise) as i64
//! 4. **Round Late**: GST is accumulated exactly and only rounded for display
//! 5. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use scanpos_core::cart::compute_totals;
//! use scanpos_core::money::{Money, TaxRate};
//! use scanpos_core::types::LineItem;
//!
//! let items = vec![
//!     LineItem::new("1", "Wireless Mouse", Money::from_cents(120_000), TaxRate::from_bps(1800), 1),
//!     LineItem::new("2", "USB-C Cable", Money::from_cents(45_000), TaxRate::from_bps(1800), 2),
//! ];
//!
//! let totals = compute_totals(&items).unwrap().rounded();
//! assert_eq!(totals.subtotal.cents(), 210_000);    // ₹2100.00
//! assert_eq!(totals.tax_total.cents(), 37_800);    // ₹378.00
//! assert_eq!(totals.grand_total.cents(), 247_800); // ₹2478.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod cart;
pub mod customer;
pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use scanpos_core::Money` instead of
// `use scanpos_core::money::Money`

pub use cart::{compute_totals, Cart, InvoiceTotals, ProductCatalog, RoundedTotals};
pub use customer::{new_customer, plan_customer_upsert, CustomerUpsert};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{finalize_invoice, InvoiceNumberGenerator, PaymentProof};
pub use money::{ExactAmount, Money, TaxRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct line items allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps invoices printable on a single page set.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted unit price, in paise (₹1,00,00,000).
///
/// `MAX_PRICE_CENTS × MAX_ITEM_QUANTITY × MAX_CART_ITEMS × 10_000` stays
/// below `i64::MAX / 2`, so exact subtotal plus GST at up to 100% never
/// overflows for a cart that passed validation.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Prefix of every generated invoice number.
pub const INVOICE_NUMBER_PREFIX: &str = "INV-";

/// Length of generated numeric barcodes (EAN-13 sized).
pub const BARCODE_LENGTH: usize = 13;
