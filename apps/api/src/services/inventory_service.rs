//! Inventory service.
//!
//! Product CRUD plus the barcode lookup used by the scanner.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use scanpos_core::barcode::generate_barcode;
use scanpos_core::validation::{
    validate_barcode, validate_name, validate_price_cents, validate_stock_level,
    validate_tax_rate_bps,
};
use scanpos_core::{Product, StockStatus, ValidationError};
use scanpos_db::Store;

use crate::error::{ApiError, ApiResult};

/// Default low-stock threshold for new products.
pub const DEFAULT_MIN_STOCK: i64 = 10;

/// Generated barcodes are retried this many times on collision.
const BARCODE_ATTEMPTS: u32 = 5;

/// Produces candidate barcodes for products created without one.
pub type BarcodeSource = Arc<dyn Fn() -> String + Send + Sync>;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Create/replace payload. `gst` is a whole percentage (0, 5, 12, 18, 28).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    /// Price in paise.
    pub price: i64,
    pub gst: u32,
    #[serde(default)]
    pub stock: i64,
    pub min_stock: Option<i64>,
    pub barcode: Option<String>,
    pub category: Option<String>,
}

/// A product as the inventory screen shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let stock_status = product.stock_status();
        ProductView {
            product,
            stock_status,
        }
    }
}

struct ValidatedProduct {
    name: String,
    price_cents: i64,
    tax_rate_bps: u32,
    stock_quantity: i64,
    min_stock_threshold: i64,
    barcode: Option<String>,
    category: Option<String>,
}

fn validate_input(input: ProductInput) -> Result<ValidatedProduct, ValidationError> {
    let name = validate_name("name", &input.name)?;
    validate_price_cents(input.price)?;
    let tax_rate_bps = input.gst.saturating_mul(100);
    validate_tax_rate_bps(tax_rate_bps)?;
    validate_stock_level("stock", input.stock)?;
    let min_stock_threshold = input.min_stock.unwrap_or(DEFAULT_MIN_STOCK);
    validate_stock_level("minStock", min_stock_threshold)?;

    let barcode = match input.barcode.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(validate_barcode(raw)?),
        _ => None,
    };
    let category = input
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Ok(ValidatedProduct {
        name,
        price_cents: input.price,
        tax_rate_bps,
        stock_quantity: input.stock,
        min_stock_threshold,
        barcode,
        category,
    })
}

// =============================================================================
// Service
// =============================================================================

pub struct InventoryService {
    store: Arc<dyn Store>,
    barcodes: BarcodeSource,
}

impl InventoryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        InventoryService {
            store,
            barcodes: Arc::new(generate_barcode),
        }
    }

    pub fn with_barcode_source(mut self, barcodes: BarcodeSource) -> Self {
        self.barcodes = barcodes;
        self
    }

    pub async fn list(&self) -> ApiResult<Vec<ProductView>> {
        let products = self.store.list_products().await?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub async fn get(&self, id: &str) -> ApiResult<ProductView> {
        self.store
            .get_product(id)
            .await?
            .map(ProductView::from)
            .ok_or_else(|| ApiError::not_found("Product", id))
    }

    /// Scanner lookup.
    pub async fn by_barcode(&self, barcode: &str) -> ApiResult<ProductView> {
        let barcode = validate_barcode(barcode)?;
        match self.store.get_product_by_barcode(&barcode).await? {
            Some(product) => Ok(product.into()),
            None => {
                debug!(%barcode, "Scanned barcode not in catalog");
                Err(ApiError::not_found("Product with barcode", &barcode))
            }
        }
    }

    /// Adds a product, generating a barcode when none is given.
    pub async fn create(&self, input: ProductInput) -> ApiResult<ProductView> {
        let valid = validate_input(input)?;
        let now = Utc::now();

        let mut product = Product {
            id: Uuid::new_v4().to_string(),
            name: valid.name,
            price_cents: valid.price_cents,
            tax_rate_bps: valid.tax_rate_bps,
            stock_quantity: valid.stock_quantity,
            min_stock_threshold: valid.min_stock_threshold,
            barcode: String::new(),
            category: valid.category,
            created_at: now,
            updated_at: now,
        };

        if let Some(barcode) = valid.barcode {
            product.barcode = barcode;
            self.store.insert_product(&product).await?;
        } else {
            self.insert_with_generated_barcode(&mut product).await?;
        }

        info!(
            product_id = %product.id,
            name = %product.name,
            barcode = %product.barcode,
            "Product created"
        );
        Ok(product.into())
    }

    async fn insert_with_generated_barcode(&self, product: &mut Product) -> ApiResult<()> {
        for attempt in 1..=BARCODE_ATTEMPTS {
            product.barcode = (self.barcodes)();
            match self.store.insert_product(product).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_unique_violation_on("barcode") => {
                    warn!(barcode = %product.barcode, attempt, "Generated barcode collided");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ApiError::conflict("Could not allocate a unique barcode"))
    }

    /// Replaces a product's editable fields. A missing barcode keeps the old one.
    pub async fn update(&self, id: &str, input: ProductInput) -> ApiResult<ProductView> {
        let valid = validate_input(input)?;
        let mut product = self
            .store
            .get_product(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", id))?;

        product.name = valid.name;
        product.price_cents = valid.price_cents;
        product.tax_rate_bps = valid.tax_rate_bps;
        product.stock_quantity = valid.stock_quantity;
        product.min_stock_threshold = valid.min_stock_threshold;
        if let Some(barcode) = valid.barcode {
            product.barcode = barcode;
        }
        product.category = valid.category;
        product.updated_at = Utc::now();

        self.store.update_product(&product).await?;

        info!(product_id = %product.id, "Product updated");
        Ok(product.into())
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.store.delete_product(id).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
