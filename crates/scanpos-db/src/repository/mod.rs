//! # Repository Module
//!
//! SQLite repository implementations for ScanPOS, and the [`Store`] trait
//! implementation that routes through them.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  HTTP service                                                          │
//! │       │                                                                 │
//! │       │  store.get_product_by_barcode("8901234567890")                 │
//! │       ▼                                                                 │
//! │  impl ProductStore for Database  (this file)                           │
//! │       │                                                                 │
//! │       │  db.products().get_by_barcode(..)                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id / get_by_barcode / get_many / list                      │
//! │  └── insert / update / delete                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and barcode lookup
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer records
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices, items, settlement
//! - [`UserRepository`](user::UserRepository) - Staff accounts
//! - [`DashboardRepository`](dashboard::DashboardRepository) - Aggregates

pub mod customer;
pub mod dashboard;
pub mod invoice;
pub mod product;
pub mod user;

use async_trait::async_trait;
use scanpos_core::{Customer, CustomerUpsert, DashboardStats, Invoice, InvoiceStatus, Product, User};

use crate::error::DbResult;
use crate::pool::Database;
use crate::store::{CustomerStore, DashboardStore, InvoiceStore, ProductStore, Store, UserStore};

#[async_trait]
impl ProductStore for Database {
    async fn insert_product(&self, product: &Product) -> DbResult<()> {
        self.products().insert(product).await
    }

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        self.products().get_by_id(id).await
    }

    async fn get_product_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        self.products().get_by_barcode(barcode).await
    }

    async fn get_products(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        self.products().get_many(ids).await
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.products().list().await
    }

    async fn update_product(&self, product: &Product) -> DbResult<()> {
        self.products().update(product).await
    }

    async fn delete_product(&self, id: &str) -> DbResult<()> {
        self.products().delete(id).await
    }
}

#[async_trait]
impl CustomerStore for Database {
    async fn insert_customer(&self, customer: &Customer) -> DbResult<()> {
        self.customers().insert(customer).await
    }

    async fn get_customer(&self, id: &str) -> DbResult<Option<Customer>> {
        self.customers().get_by_id(id).await
    }

    async fn get_customer_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        self.customers().get_by_phone(phone).await
    }

    async fn get_customer_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        self.customers().get_by_email(email).await
    }

    async fn list_customers(&self) -> DbResult<Vec<Customer>> {
        self.customers().list().await
    }

    async fn update_customer(&self, customer: &Customer) -> DbResult<()> {
        self.customers().update_details(customer).await
    }
}

#[async_trait]
impl InvoiceStore for Database {
    async fn insert_invoice(&self, invoice: &Invoice) -> DbResult<()> {
        self.invoices().insert(invoice).await
    }

    async fn get_invoice(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        self.invoices().get_by_number(invoice_number).await
    }

    async fn invoice_number_exists(&self, invoice_number: &str) -> DbResult<bool> {
        self.invoices().number_exists(invoice_number).await
    }

    async fn list_invoices(&self, status: Option<InvoiceStatus>) -> DbResult<Vec<Invoice>> {
        self.invoices().list(status).await
    }

    async fn save_invoice_state(&self, invoice: &Invoice, expected: InvoiceStatus) -> DbResult<()> {
        self.invoices().save_state(invoice, expected).await
    }

    async fn settle_invoice(&self, invoice: &Invoice) -> DbResult<CustomerUpsert> {
        self.invoices().settle(invoice).await
    }
}

#[async_trait]
impl UserStore for Database {
    async fn insert_user(&self, user: &User) -> DbResult<()> {
        self.users().insert(user).await
    }

    async fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.users().get_by_email(email).await
    }
}

#[async_trait]
impl DashboardStore for Database {
    async fn dashboard_stats(&self) -> DbResult<DashboardStats> {
        self.dashboard().stats().await
    }
}

#[async_trait]
impl Store for Database {
    async fn health_check(&self) -> bool {
        Database::health_check(self).await
    }
}
