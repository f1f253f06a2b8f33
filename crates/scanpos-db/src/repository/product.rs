//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD for the inventory screen
//! - Barcode lookup for the scanner flow
//! - Batch lookup by id when building a cart
//!
//! ## Scanner Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Camera decodes "8901234567890"                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET /inventory/barcode/8901234567890                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get_by_barcode() ← idx_products_barcode (UNIQUE)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Product added to the invoice cart                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use scanpos_core::Product;

const PRODUCT_COLUMNS: &str = "id, name, price_cents, tax_rate_bps, stock_quantity, \
     min_stock_threshold, barcode, category, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.get_by_barcode("8901234567890").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        debug!(barcode = %barcode, "Looking up product by barcode");

        let sql = format!("SELECT {} FROM products WHERE barcode = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets all products whose id is in `ids`.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM products WHERE id IN ({})",
            PRODUCT_COLUMNS, placeholders
        );

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let products = query.fetch_all(&self.pool).await?;

        debug!(requested = ids.len(), found = products.len(), "Loaded products");
        Ok(products)
    }

    /// Lists all products sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY name, id", PRODUCT_COLUMNS);
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - Barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, barcode = %product.barcode, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents, tax_rate_bps, stock_quantity,
                min_stock_threshold, barcode, category, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.stock_quantity)
        .bind(product.min_stock_threshold)
        .bind(&product.barcode)
        .bind(&product.category)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e.into(), &product.barcode))?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                tax_rate_bps = ?4,
                stock_quantity = ?5,
                min_stock_threshold = ?6,
                barcode = ?7,
                category = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.stock_quantity)
        .bind(product.min_stock_threshold)
        .bind(&product.barcode)
        .bind(&product.category)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e.into(), &product.barcode))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product. Past invoices keep their line snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// SQLite does not echo the offending value; fill it in from the row.
pub(crate) fn with_value(err: DbError, value: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, value),
        other => other,
    }
}
