//! # Domain Types
//!
//! Core domain types used throughout ScanPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Invoice      │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode (biz)  │   │  invoice_number │   │  phone (biz)    │       │
//! │  │  price_cents    │   │  items[]        │   │  total_spent    │       │
//! │  │  tax_rate_bps   │   │  status         │   │  status         │       │
//! │  └────────┬────────┘   └────────┬────────┘   └─────────────────┘       │
//! │           │ snapshot            │ contains                              │
//! │           ▼                     ▼                                       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │  InvoiceStatus  │   │      User       │       │
//! │  │  name, price    │   │  Pending        │   │  email (biz)    │       │
//! │  │  tax, quantity  │   │  Paid           │   │  role           │       │
//! │  └─────────────────┘   │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID: (barcode, invoice_number, phone, email) - human-facing, unique

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{ExactAmount, Money, TaxRate};

// =============================================================================
// Product
// =============================================================================

/// Stock level classification shown on the inventory screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on the invoice.
    pub name: String,

    /// Price in paise.
    pub price_cents: i64,

    /// GST rate in basis points (1800 = 18%).
    pub tax_rate_bps: u32,

    /// Units currently on the shelf.
    pub stock_quantity: i64,

    /// At or below this level the product is flagged as low stock.
    pub min_stock_threshold: i64,

    /// Scannable barcode, unique across the catalog.
    pub barcode: String,

    pub category: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Classifies the current stock level.
    ///
    /// ## Example
    /// ```text
    /// stock 0,  threshold 5  → OutOfStock
    /// stock 3,  threshold 5  → LowStock
    /// stock 5,  threshold 5  → LowStock
    /// stock 12, threshold 5  → InStock
    /// ```
    pub fn stock_status(&self) -> StockStatus {
        if self.stock_quantity <= 0 {
            StockStatus::OutOfStock
        } else if self.stock_quantity <= self.min_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry within a cart or invoice.
///
/// Uses the snapshot pattern: name, price and GST rate are frozen at the time
/// the product is added, so later catalog edits never change an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// GST rate at time of sale (frozen).
    pub tax_rate: TaxRate,
    pub quantity: i64,
}

impl LineItem {
    /// Creates a line item from raw parts.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        tax_rate: TaxRate,
        quantity: i64,
    ) -> Self {
        LineItem {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            tax_rate,
            quantity,
        }
    }

    /// Snapshots a catalog product into a line item.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem::new(
            product.id.clone(),
            product.name.clone(),
            product.price(),
            product.tax_rate(),
            quantity,
        )
    }

    /// Price × quantity, before GST.
    #[inline]
    pub fn line_subtotal(&self) -> CoreResult<Money> {
        self.unit_price
            .multiply_quantity(self.quantity)
            .ok_or(CoreError::AmountOverflow("line subtotal"))
    }

    /// Unrounded GST for this line.
    #[inline]
    pub fn line_tax(&self) -> CoreResult<ExactAmount> {
        ExactAmount::tax_on(self.unit_price, self.quantity, self.tax_rate)
            .ok_or(CoreError::AmountOverflow("line GST"))
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// Buyer details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// The status of an invoice.
///
/// ```text
///            verify ok
///  Pending ─────────────► Paid       (terminal)
///     │  ▲
///     │  └── verify failed, retry allowed
///     │
///     └──────────────────► Cancelled  (terminal)
///       verify failed on final attempt / explicit cancel
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// Paid and Cancelled invoices never change again.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Pending
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "pending".to_string(),
                    "paid".to_string(),
                    "cancelled".to_string(),
                ],
            }),
        }
    }
}

/// A finalized billing record.
///
/// Totals are stored rounded to paise; `grand_total` always equals
/// `subtotal + tax_total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax_total: Money,
    pub grand_total: Money,
    pub status: InvoiceStatus,
    /// Verification failures recorded while the invoice stayed pending.
    pub failed_attempts: u32,
    /// Gateway order created for this invoice.
    pub payment_order_id: Option<String>,
    /// Gateway payment that settled this invoice.
    pub payment_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

impl Default for CustomerStatus {
    fn default() -> Self {
        CustomerStatus::Active
    }
}

/// A buyer, keyed by phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Unique business key.
    pub phone: String,
    pub email: Option<String>,
    /// Lifetime spend in paise. Only ever increased by paid invoices.
    pub total_spent_cents: i64,
    #[ts(as = "Option<String>")]
    pub last_purchase_at: Option<DateTime<Utc>>,
    pub status: CustomerStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn total_spent(&self) -> Money {
        Money::from_cents(self.total_spent_cents)
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

/// A staff account with its business profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub business_phone: Option<String>,
    pub business_gst: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Aggregate counters for the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    /// Sum of grand totals of paid invoices.
    pub total_sales: Money,
    pub total_invoices: i64,
    pub low_stock_items: i64,
    pub pending_payments: i64,
    pub active_customers: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
