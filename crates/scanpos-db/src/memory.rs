//! # In-Memory Store
//!
//! A [`Store`] kept entirely in process memory, for tests and local demos.
//! It enforces the same unique keys and guarded transitions as the SQLite
//! schema, so both implementations satisfy one contract.
//!
//! All state sits behind one `tokio::sync::RwLock`, which makes every
//! operation (settlement included) atomic with respect to the others.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use scanpos_core::{
    plan_customer_upsert, Customer, CustomerStatus, CustomerUpsert, DashboardStats, Invoice,
    InvoiceStatus, Money, Product, User,
};

use crate::error::{DbError, DbResult};
use crate::store::{CustomerStore, DashboardStore, InvoiceStore, ProductStore, Store, UserStore};

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<String, Product>,
    customers: HashMap<String, Customer>,
    /// Keyed by invoice number.
    invoices: HashMap<String, Invoice>,
    /// Keyed by email.
    users: HashMap<String, User>,
}

impl Inner {
    fn customer_by_phone(&self, phone: &str) -> Option<&Customer> {
        self.customers.values().find(|c| c.phone == phone)
    }

    fn customer_by_email(&self, email: &str) -> Option<&Customer> {
        self.customers
            .values()
            .filter(|c| c.email.as_deref() == Some(email))
            .min_by_key(|c| c.created_at)
    }

    fn guard_invoice(&self, invoice_number: &str, expected: InvoiceStatus) -> DbResult<()> {
        match self.invoices.get(invoice_number) {
            None => Err(DbError::not_found("Invoice", invoice_number)),
            Some(stored) if stored.status != expected => Err(DbError::Conflict(format!(
                "Invoice {} is {}",
                invoice_number, stored.status
            ))),
            Some(_) => Ok(()),
        }
    }
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, barcode = %product.barcode, "Inserting product (memory)");

        let mut inner = self.inner.write().await;
        if inner.products.contains_key(&product.id) {
            return Err(DbError::duplicate("products.id", &product.id));
        }
        if inner.products.values().any(|p| p.barcode == product.barcode) {
            return Err(DbError::duplicate("products.barcode", &product.barcode));
        }
        inner.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        Ok(self.inner.read().await.products.get(id).cloned())
    }

    async fn get_product_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.values().find(|p| p.barcode == barcode).cloned())
    }

    async fn get_products(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        let inner = self.inner.read().await;
        let mut products: Vec<Product> = inner.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn update_product(&self, product: &Product) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.products.contains_key(&product.id) {
            return Err(DbError::not_found("Product", &product.id));
        }
        if inner
            .products
            .values()
            .any(|p| p.id != product.id && p.barcode == product.barcode)
        {
            return Err(DbError::duplicate("products.barcode", &product.barcode));
        }

        // created_at is immutable, matching the SQL UPDATE
        let created_at = inner.products[&product.id].created_at;
        let mut updated = product.clone();
        updated.created_at = created_at;
        inner.products.insert(product.id.clone(), updated);
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> DbResult<()> {
        match self.inner.write().await.products.remove(id) {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Product", id)),
        }
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn insert_customer(&self, customer: &Customer) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        if inner.customer_by_phone(&customer.phone).is_some() {
            return Err(DbError::duplicate("customers.phone", &customer.phone));
        }
        inner.customers.insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn get_customer(&self, id: &str) -> DbResult<Option<Customer>> {
        Ok(self.inner.read().await.customers.get(id).cloned())
    }

    async fn get_customer_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        Ok(self.inner.read().await.customer_by_phone(phone).cloned())
    }

    async fn get_customer_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        Ok(self.inner.read().await.customer_by_email(email).cloned())
    }

    async fn list_customers(&self) -> DbResult<Vec<Customer>> {
        let inner = self.inner.read().await;
        let mut customers: Vec<Customer> = inner.customers.values().cloned().collect();
        // Buyers first (latest purchase first), then never-purchased by name
        customers.sort_by(|a, b| {
            b.last_purchase_at
                .is_some()
                .cmp(&a.last_purchase_at.is_some())
                .then_with(|| b.last_purchase_at.cmp(&a.last_purchase_at))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(customers)
    }

    async fn update_customer(&self, customer: &Customer) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        if inner
            .customers
            .values()
            .any(|c| c.id != customer.id && c.phone == customer.phone)
        {
            return Err(DbError::duplicate("customers.phone", &customer.phone));
        }

        let stored = inner
            .customers
            .get_mut(&customer.id)
            .ok_or_else(|| DbError::not_found("Customer", &customer.id))?;
        stored.name = customer.name.clone();
        stored.phone = customer.phone.clone();
        stored.email = customer.email.clone();
        stored.status = customer.status;
        stored.updated_at = customer.updated_at;
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn insert_invoice(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(invoice_number = %invoice.invoice_number, "Inserting invoice (memory)");

        let mut inner = self.inner.write().await;
        if inner.invoices.contains_key(&invoice.invoice_number) {
            return Err(DbError::duplicate(
                "invoices.invoice_number",
                &invoice.invoice_number,
            ));
        }
        inner
            .invoices
            .insert(invoice.invoice_number.clone(), invoice.clone());
        Ok(())
    }

    async fn get_invoice(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        Ok(self.inner.read().await.invoices.get(invoice_number).cloned())
    }

    async fn invoice_number_exists(&self, invoice_number: &str) -> DbResult<bool> {
        Ok(self.inner.read().await.invoices.contains_key(invoice_number))
    }

    async fn list_invoices(&self, status: Option<InvoiceStatus>) -> DbResult<Vec<Invoice>> {
        let inner = self.inner.read().await;
        let mut invoices: Vec<Invoice> = inner
            .invoices
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .cloned()
            .collect();
        invoices.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.invoice_number.cmp(&a.invoice_number))
        });
        Ok(invoices)
    }

    async fn save_invoice_state(&self, invoice: &Invoice, expected: InvoiceStatus) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        inner.guard_invoice(&invoice.invoice_number, expected)?;

        if let Some(stored) = inner.invoices.get_mut(&invoice.invoice_number) {
            stored.status = invoice.status;
            stored.failed_attempts = invoice.failed_attempts;
            stored.payment_order_id = invoice.payment_order_id.clone();
            stored.payment_id = invoice.payment_id.clone();
            stored.paid_at = invoice.paid_at;
            stored.updated_at = invoice.updated_at;
        }
        Ok(())
    }

    async fn settle_invoice(&self, invoice: &Invoice) -> DbResult<CustomerUpsert> {
        let paid_at = invoice.paid_at.unwrap_or(invoice.updated_at);

        let mut inner = self.inner.write().await;
        inner.guard_invoice(&invoice.invoice_number, InvoiceStatus::Pending)?;

        let by_phone = inner.customer_by_phone(&invoice.customer.phone).cloned();
        let by_email = match (&by_phone, &invoice.customer.email) {
            (None, Some(email)) => inner.customer_by_email(email).cloned(),
            _ => None,
        };
        let plan = plan_customer_upsert(
            by_phone.as_ref(),
            by_email.as_ref(),
            &invoice.customer,
            invoice.grand_total,
            paid_at,
        );

        if let Some(stored) = inner.invoices.get_mut(&invoice.invoice_number) {
            stored.status = InvoiceStatus::Paid;
            if invoice.payment_order_id.is_some() {
                stored.payment_order_id = invoice.payment_order_id.clone();
            }
            stored.payment_id = invoice.payment_id.clone();
            stored.paid_at = Some(paid_at);
            stored.updated_at = paid_at;
        }

        let customer = plan.customer().clone();
        inner.customers.insert(customer.id.clone(), customer);

        info!(
            invoice_number = %invoice.invoice_number,
            customer_id = %plan.customer().id,
            created = plan.is_create(),
            "Invoice settled (memory)"
        );
        Ok(plan)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.email) {
            return Err(DbError::duplicate("users.email", &user.email));
        }
        inner.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self.inner.read().await.users.get(email).cloned())
    }
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn dashboard_stats(&self) -> DbResult<DashboardStats> {
        let inner = self.inner.read().await;

        let total_sales: Money = inner
            .invoices
            .values()
            .filter(|i| i.status == InvoiceStatus::Paid)
            .map(|i| i.grand_total)
            .sum();

        Ok(DashboardStats {
            total_sales,
            total_invoices: inner.invoices.len() as i64,
            low_stock_items: inner
                .products
                .values()
                .filter(|p| p.stock_quantity <= p.min_stock_threshold)
                .count() as i64,
            pending_payments: inner
                .invoices
                .values()
                .filter(|i| i.status == InvoiceStatus::Pending)
                .count() as i64,
            active_customers: inner
                .customers
                .values()
                .filter(|c| c.status == CustomerStatus::Active)
                .count() as i64,
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> bool {
        true
    }
}
