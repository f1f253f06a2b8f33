//! # Dashboard Queries
//!
//! Aggregate counters for the dashboard cards, computed in SQL.
//!
//! ```text
//! totalSales       SUM(total_cents) of paid invoices
//! totalInvoices    COUNT(*) of all invoices
//! pendingPayments  COUNT(*) of pending invoices
//! lowStockItems    products with stock_quantity <= min_stock_threshold
//!                  (out-of-stock products are included)
//! activeCustomers  customers with status 'active'
//! ```

use sqlx::{FromRow, SqlitePool};

use crate::error::DbResult;
use scanpos_core::{DashboardStats, Money};

#[derive(Debug, FromRow)]
struct InvoiceAggregates {
    total_sales_cents: i64,
    total_invoices: i64,
    pending_payments: i64,
}

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    pub async fn stats(&self) -> DbResult<DashboardStats> {
        let invoices = sqlx::query_as::<_, InvoiceAggregates>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'paid' THEN total_cents ELSE 0 END), 0)
                    AS total_sales_cents,
                COUNT(*) AS total_invoices,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0)
                    AS pending_payments
            FROM invoices
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let low_stock_items: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE stock_quantity <= min_stock_threshold",
        )
        .fetch_one(&self.pool)
        .await?;

        let active_customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardStats {
            total_sales: Money::from_cents(invoices.total_sales_cents),
            total_invoices: invoices.total_invoices,
            low_stock_items,
            pending_payments: invoices.pending_payments,
            active_customers,
        })
    }
}
