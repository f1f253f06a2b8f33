//! # Store Traits
//!
//! The storage contract the HTTP services depend on. Two implementations
//! live in this crate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   InvoiceService / InventoryService / ...                               │
//! │          │                                                              │
//! │          │  Arc<dyn Store>                                              │
//! │          ▼                                                              │
//! │   ┌──────────────────────────────────────────────┐                      │
//! │   │ Store = ProductStore + CustomerStore          │                      │
//! │   │       + InvoiceStore + UserStore              │                      │
//! │   │       + DashboardStore                        │                      │
//! │   └──────────────┬──────────────────┬────────────┘                      │
//! │                  │                  │                                   │
//! │          ┌───────▼──────┐   ┌───────▼──────┐                            │
//! │          │   Database   │   │ MemoryStore  │                            │
//! │          │ (SQLite/sqlx)│   │ (tests, dev) │                            │
//! │          └──────────────┘   └──────────────┘                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both implementations must pass the same contract tests.

use async_trait::async_trait;
use scanpos_core::{Customer, CustomerUpsert, DashboardStats, Invoice, InvoiceStatus, Product, User};

use crate::error::DbResult;

/// Product catalog persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a product. Duplicate barcode → `UniqueViolation`.
    async fn insert_product(&self, product: &Product) -> DbResult<()>;

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>>;

    async fn get_product_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>>;

    /// Fetches every product whose id is in `ids`. Unknown ids are skipped.
    async fn get_products(&self, ids: &[String]) -> DbResult<Vec<Product>>;

    /// All products ordered by name.
    async fn list_products(&self) -> DbResult<Vec<Product>>;

    /// Replaces all mutable fields. Unknown id → `NotFound`.
    async fn update_product(&self, product: &Product) -> DbResult<()>;

    /// Unknown id → `NotFound`.
    async fn delete_product(&self, id: &str) -> DbResult<()>;
}

/// Customer record persistence.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Duplicate phone → `UniqueViolation`.
    async fn insert_customer(&self, customer: &Customer) -> DbResult<()>;

    async fn get_customer(&self, id: &str) -> DbResult<Option<Customer>>;

    async fn get_customer_by_phone(&self, phone: &str) -> DbResult<Option<Customer>>;

    async fn get_customer_by_email(&self, email: &str) -> DbResult<Option<Customer>>;

    /// All customers, most recent purchase first.
    async fn list_customers(&self) -> DbResult<Vec<Customer>>;

    /// Replaces name, phone, email and status. Unknown id → `NotFound`.
    async fn update_customer(&self, customer: &Customer) -> DbResult<()>;
}

/// Invoice persistence and settlement.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Inserts an invoice with its line items.
    /// Duplicate invoice number → `UniqueViolation` on `invoice_number`.
    async fn insert_invoice(&self, invoice: &Invoice) -> DbResult<()>;

    async fn get_invoice(&self, invoice_number: &str) -> DbResult<Option<Invoice>>;

    async fn invoice_number_exists(&self, invoice_number: &str) -> DbResult<bool>;

    /// Newest first, optionally filtered by status.
    async fn list_invoices(&self, status: Option<InvoiceStatus>) -> DbResult<Vec<Invoice>>;

    /// Persists status, attempt counter and payment fields of `invoice`, only
    /// if the stored row is still `expected`.
    ///
    /// Unknown number → `NotFound`; state moved on → `Conflict`.
    async fn save_invoice_state(&self, invoice: &Invoice, expected: InvoiceStatus) -> DbResult<()>;

    /// Atomically marks a pending invoice as paid and applies the customer
    /// upsert planned from it.
    ///
    /// `invoice` must already carry the paid status, payment id and
    /// `paid_at`. The stored row must still be pending, otherwise nothing is
    /// written and `Conflict` is returned, so spend is never counted twice.
    async fn settle_invoice(&self, invoice: &Invoice) -> DbResult<CustomerUpsert>;
}

/// Staff account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Duplicate email → `UniqueViolation`.
    async fn insert_user(&self, user: &User) -> DbResult<()>;

    async fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>>;
}

/// Read-only aggregates.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn dashboard_stats(&self) -> DbResult<DashboardStats>;
}

/// Everything the application needs from storage.
#[async_trait]
pub trait Store: ProductStore + CustomerStore + InvoiceStore + UserStore + DashboardStore {
    /// `true` when the backend answers queries.
    async fn health_check(&self) -> bool;
}
