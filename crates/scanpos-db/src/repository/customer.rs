//! # Customer Repository
//!
//! Database operations for customer records. Spend fields are written only
//! by invoice settlement (see [`InvoiceRepository::settle`]); the methods
//! here never touch `total_spent_cents`.
//!
//! [`InvoiceRepository::settle`]: crate::repository::invoice::InvoiceRepository::settle

use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use super::product::with_value;
use crate::error::{DbError, DbResult};
use scanpos_core::Customer;

pub(crate) const CUSTOMER_COLUMNS: &str = "id, name, phone, email, total_spent_cents, \
     last_purchase_at, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {} FROM customers WHERE id = ?1", CUSTOMER_COLUMNS);
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        find_by_phone(&self.pool, phone).await
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        find_by_email(&self.pool, email).await
    }

    /// Lists customers, most recent buyers first.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {} FROM customers \
             ORDER BY last_purchase_at IS NULL, last_purchase_at DESC, name",
            CUSTOMER_COLUMNS
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Inserts a customer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Phone already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Inserting customer");
        insert_customer(&self.pool, customer).await
    }

    /// Updates contact details and status.
    pub async fn update_details(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                status = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.status)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e.into(), &customer.phone))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }
}

// =============================================================================
// Executor-generic helpers (shared with the settlement transaction)
// =============================================================================

pub(crate) async fn find_by_phone<'e, E>(executor: E, phone: &str) -> DbResult<Option<Customer>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM customers WHERE phone = ?1", CUSTOMER_COLUMNS);
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(phone)
        .fetch_optional(executor)
        .await?;

    Ok(customer)
}

pub(crate) async fn find_by_email<'e, E>(executor: E, email: &str) -> DbResult<Option<Customer>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM customers WHERE email = ?1 ORDER BY created_at LIMIT 1",
        CUSTOMER_COLUMNS
    );
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await?;

    Ok(customer)
}

pub(crate) async fn insert_customer<'e, E>(executor: E, customer: &Customer) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO customers (
            id, name, phone, email, total_spent_cents,
            last_purchase_at, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(customer.total_spent_cents)
    .bind(customer.last_purchase_at)
    .bind(customer.status)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(executor)
    .await
    .map_err(|e| with_value(e.into(), &customer.phone))?;

    Ok(())
}
