//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Lifecycle in the Database                    │
//! │                                                                         │
//! │  1. POST /invoice/generate                                             │
//! │     └── insert()                                                        │
//! │         ├── INSERT INTO invoices (status = 'pending')                   │
//! │         └── INSERT INTO invoice_items (one row per line)                │
//! │                                                                         │
//! │  2. POST /invoice/verify-payment (gateway accepted)                     │
//! │     └── settle()  ── ONE TRANSACTION ──────────────────────┐            │
//! │         ├── UPDATE invoices SET status = 'paid'            │            │
//! │         │   WHERE ... AND status = 'pending'  ← guard      │            │
//! │         ├── SELECT customer by phone / email               │            │
//! │         └── UPDATE or INSERT customers (spend += total)    │            │
//! │                                                 COMMIT ────┘            │
//! │                                                                         │
//! │  3. POST /invoice/verify-payment (gateway rejected) / cancel           │
//! │     └── save_state()  UPDATE ... WHERE status = 'pending'              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use super::customer::{find_by_email, find_by_phone, insert_customer};
use super::product::with_value;
use crate::error::{DbError, DbResult};
use scanpos_core::{
    plan_customer_upsert, CustomerInfo, CustomerUpsert, Invoice, InvoiceStatus, LineItem, Money,
    TaxRate,
};

const INVOICE_COLUMNS: &str = "id, invoice_number, customer_name, customer_phone, \
     customer_email, subtotal_cents, tax_cents, total_cents, status, failed_attempts, \
     payment_order_id, payment_id, created_at, updated_at, paid_at";

// =============================================================================
// Row Types
// =============================================================================

/// Flat `invoices` row.
#[derive(Debug, FromRow)]
struct InvoiceRow {
    id: String,
    invoice_number: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    status: InvoiceStatus,
    failed_attempts: u32,
    payment_order_id: Option<String>,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

/// Flat `invoice_items` row.
#[derive(Debug, FromRow)]
struct InvoiceItemRow {
    product_id: String,
    name: String,
    unit_price_cents: i64,
    tax_rate_bps: u32,
    quantity: i64,
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<InvoiceItemRow>) -> Invoice {
        Invoice {
            id: self.id,
            invoice_number: self.invoice_number,
            customer: CustomerInfo {
                name: self.customer_name,
                phone: self.customer_phone,
                email: self.customer_email,
            },
            items: items
                .into_iter()
                .map(|i| {
                    LineItem::new(
                        i.product_id,
                        i.name,
                        Money::from_cents(i.unit_price_cents),
                        TaxRate::from_bps(i.tax_rate_bps),
                        i.quantity,
                    )
                })
                .collect(),
            subtotal: Money::from_cents(self.subtotal_cents),
            tax_total: Money::from_cents(self.tax_cents),
            grand_total: Money::from_cents(self.total_cents),
            status: self.status,
            failed_attempts: self.failed_attempts,
            payment_order_id: self.payment_order_id,
            payment_id: self.payment_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            paid_at: self.paid_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Inserts an invoice and its line items in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` on `invoices.invoice_number` when the
    ///   number is taken; the caller regenerates and retries
    pub async fn insert(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(
            invoice_number = %invoice.invoice_number,
            items = invoice.items.len(),
            "Inserting invoice"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, customer_name, customer_phone, customer_email,
                subtotal_cents, tax_cents, total_cents, status, failed_attempts,
                payment_order_id, payment_id, created_at, updated_at, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer.name)
        .bind(&invoice.customer.phone)
        .bind(&invoice.customer.email)
        .bind(invoice.subtotal.cents())
        .bind(invoice.tax_total.cents())
        .bind(invoice.grand_total.cents())
        .bind(invoice.status)
        .bind(invoice.failed_attempts)
        .bind(&invoice.payment_order_id)
        .bind(&invoice.payment_id)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .bind(invoice.paid_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| with_value(e.into(), &invoice.invoice_number))?;

        for (position, item) in invoice.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    invoice_id, position, product_id, name,
                    unit_price_cents, tax_rate_bps, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&invoice.id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.unit_price.cents())
            .bind(item.tax_rate.bps())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an invoice with its items by invoice number.
    pub async fn get_by_number(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        let sql = format!(
            "SELECT {} FROM invoices WHERE invoice_number = ?1",
            INVOICE_COLUMNS
        );
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.load_items(&row.id).await?;
                Ok(Some(row.into_invoice(items)))
            }
            None => Ok(None),
        }
    }

    pub async fn number_exists(&self, invoice_number: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM invoices WHERE invoice_number = ?1)")
                .bind(invoice_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Lists invoices newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<InvoiceStatus>) -> DbResult<Vec<Invoice>> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM invoices WHERE status = ?1 \
                     ORDER BY created_at DESC, invoice_number DESC",
                    INVOICE_COLUMNS
                );
                sqlx::query_as::<_, InvoiceRow>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM invoices ORDER BY created_at DESC, invoice_number DESC",
                    INVOICE_COLUMNS
                );
                sqlx::query_as::<_, InvoiceRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut invoices = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(&row.id).await?;
            invoices.push(row.into_invoice(items));
        }

        debug!(count = invoices.len(), "Listed invoices");
        Ok(invoices)
    }

    /// Writes status, attempt counter and payment fields, guarded by the
    /// expected current status.
    pub async fn save_state(&self, invoice: &Invoice, expected: InvoiceStatus) -> DbResult<()> {
        debug!(
            invoice_number = %invoice.invoice_number,
            from = %expected,
            to = %invoice.status,
            "Saving invoice state"
        );

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = ?2,
                failed_attempts = ?3,
                payment_order_id = ?4,
                payment_id = ?5,
                paid_at = ?6,
                updated_at = ?7
            WHERE invoice_number = ?1 AND status = ?8
            "#,
        )
        .bind(&invoice.invoice_number)
        .bind(invoice.status)
        .bind(invoice.failed_attempts)
        .bind(&invoice.payment_order_id)
        .bind(&invoice.payment_id)
        .bind(invoice.paid_at)
        .bind(invoice.updated_at)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_conflict(&invoice.invoice_number).await);
        }

        Ok(())
    }

    /// Marks a pending invoice paid and upserts its customer atomically.
    ///
    /// ## Concurrency
    /// The `status = 'pending'` guard on the UPDATE means only one of two
    /// racing confirmations touches the customer; the other gets `Conflict`.
    pub async fn settle(&self, invoice: &Invoice) -> DbResult<CustomerUpsert> {
        let paid_at = invoice.paid_at.unwrap_or(invoice.updated_at);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = ?2,
                payment_order_id = COALESCE(?3, payment_order_id),
                payment_id = ?4,
                paid_at = ?5,
                updated_at = ?5
            WHERE invoice_number = ?1 AND status = ?6
            "#,
        )
        .bind(&invoice.invoice_number)
        .bind(InvoiceStatus::Paid)
        .bind(&invoice.payment_order_id)
        .bind(&invoice.payment_id)
        .bind(paid_at)
        .bind(InvoiceStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(self.missing_or_conflict(&invoice.invoice_number).await);
        }

        let by_phone = find_by_phone(&mut *tx, &invoice.customer.phone).await?;
        let by_email = match (&by_phone, &invoice.customer.email) {
            (None, Some(email)) => find_by_email(&mut *tx, email).await?,
            _ => None,
        };

        let plan = plan_customer_upsert(
            by_phone.as_ref(),
            by_email.as_ref(),
            &invoice.customer,
            invoice.grand_total,
            paid_at,
        );

        match &plan {
            CustomerUpsert::Update(customer) => {
                sqlx::query(
                    r#"
                    UPDATE customers SET
                        name = ?2,
                        email = ?3,
                        total_spent_cents = ?4,
                        last_purchase_at = ?5,
                        status = ?6,
                        updated_at = ?7
                    WHERE id = ?1
                    "#,
                )
                .bind(&customer.id)
                .bind(&customer.name)
                .bind(&customer.email)
                .bind(customer.total_spent_cents)
                .bind(customer.last_purchase_at)
                .bind(customer.status)
                .bind(customer.updated_at)
                .execute(&mut *tx)
                .await?;
            }
            CustomerUpsert::Create(customer) => {
                insert_customer(&mut *tx, customer).await?;
            }
        }

        tx.commit().await?;

        info!(
            invoice_number = %invoice.invoice_number,
            customer_id = %plan.customer().id,
            created = plan.is_create(),
            "Invoice settled"
        );
        Ok(plan)
    }

    async fn load_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItemRow>> {
        let items = sqlx::query_as::<_, InvoiceItemRow>(
            r#"
            SELECT product_id, name, unit_price_cents, tax_rate_bps, quantity
            FROM invoice_items
            WHERE invoice_id = ?1
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Explains why a guarded update touched no rows.
    async fn missing_or_conflict(&self, invoice_number: &str) -> DbError {
        let status = sqlx::query_scalar::<_, InvoiceStatus>(
            "SELECT status FROM invoices WHERE invoice_number = ?1",
        )
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await;

        match status {
            Ok(Some(status)) => {
                DbError::Conflict(format!("Invoice {} is {}", invoice_number, status))
            }
            Ok(None) => DbError::not_found("Invoice", invoice_number),
            Err(e) => e.into(),
        }
    }
}
