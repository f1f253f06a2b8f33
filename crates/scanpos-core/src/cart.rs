//! # Cart
//!
//! The in-progress, mutable collection of line items before an invoice is
//! finalized, plus the pure totals computation.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Frontend Action          Engine Call                  Cart Change      │
//! │  ───────────────          ───────────                  ───────────      │
//! │                                                                         │
//! │  Scan / pick product ───► add_or_update_line_item(+1) ► push or qty+1  │
//! │                                                                         │
//! │  Press "−" ─────────────► add_or_update_line_item(-1) ► qty-1 / remove │
//! │                                                                         │
//! │  Show summary ──────────► totals() ──────────────────► (read only)     │
//! │                                                                         │
//! │  Generate invoice ──────► finalize_invoice(cart, ..) ─► Invoice        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! ```text
//! subtotal    = Σ unit_price × quantity                 (whole paise)
//! tax_total   = Σ unit_price × quantity × gst_bps / 1e4 (exact, unrounded)
//! grand_total = subtotal + tax_total                    (exact, unrounded)
//! ```
//! Rounding happens once, in [`InvoiceTotals::rounded`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{ExactAmount, Money};
use crate::types::{LineItem, Product};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Product Catalog
// =============================================================================

/// Read-only product lookup used while building a cart.
///
/// The engine never talks to storage; callers load the products they need
/// and hand them over through this trait.
pub trait ProductCatalog {
    fn find_product(&self, product_id: &str) -> Option<&Product>;
}

impl ProductCatalog for [Product] {
    fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.iter().find(|p| p.id == product_id)
    }
}

impl ProductCatalog for Vec<Product> {
    fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.as_slice().find_product(product_id)
    }
}

impl ProductCatalog for HashMap<String, Product> {
    fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.get(product_id)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product raises quantity)
/// - Every quantity is between 1 and MAX_ITEM_QUANTITY (999)
/// - At most MAX_CART_ITEMS (100) lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product or changes the quantity of its line.
    ///
    /// ## Behavior
    /// - Line present: quantity += `quantity_delta`; a result of 0 or less
    ///   removes the line
    /// - Line absent: inserts a snapshot with `max(1, quantity_delta)`
    ///
    /// ## Errors
    /// - `ProductNotFound` - id does not resolve in `catalog`
    /// - `InvalidQuantity` - negative delta for a line that is not in the cart
    /// - `QuantityTooLarge` - resulting quantity above 999
    /// - `CartTooLarge` - a 101st distinct line
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use scanpos_core::{Cart, Product};
    ///
    /// let now = Utc::now();
    /// let catalog = vec![Product {
    ///     id: "p-1".into(), name: "USB-C Cable".into(), price_cents: 45_000,
    ///     tax_rate_bps: 1800, stock_quantity: 10, min_stock_threshold: 2,
    ///     barcode: "0000000000001".into(), category: None,
    ///     created_at: now, updated_at: now,
    /// }];
    ///
    /// let mut cart = Cart::new();
    /// cart.add_or_update_line_item(&catalog, "p-1", 1).unwrap();
    /// cart.add_or_update_line_item(&catalog, "p-1", 1).unwrap();
    /// assert_eq!(cart.len(), 1);
    /// assert_eq!(cart.items()[0].quantity, 2);
    /// ```
    pub fn add_or_update_line_item<C>(
        &mut self,
        catalog: &C,
        product_id: &str,
        quantity_delta: i64,
    ) -> CoreResult<()>
    where
        C: ProductCatalog + ?Sized,
    {
        let product = catalog
            .find_product(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if let Some(pos) = self.items.iter().position(|i| i.product_id == product.id) {
            let new_qty = self.items[pos].quantity + quantity_delta;

            if new_qty <= 0 {
                self.items.remove(pos);
                return Ok(());
            }
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }

            self.items[pos].quantity = new_qty;
            return Ok(());
        }

        if quantity_delta < 0 {
            return Err(CoreError::InvalidQuantity {
                product_id: product_id.to_string(),
                delta: quantity_delta,
            });
        }

        let quantity = quantity_delta.max(1);
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(LineItem::from_product(product, quantity));
        Ok(())
    }

    /// Removes a line regardless of its quantity. Returns whether it existed.
    pub fn remove_line_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Exact totals for the current lines.
    pub fn totals(&self) -> CoreResult<InvoiceTotals> {
        compute_totals(&self.items)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Exact invoice totals. GST is kept in 1/10000 paise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax_total: ExactAmount,
    pub grand_total: ExactAmount,
}

impl InvoiceTotals {
    /// Rounds for presentation and persistence.
    ///
    /// The subtotal is already whole, so
    /// `round(grand_total) == subtotal + round(tax_total)` always holds.
    pub fn rounded(&self) -> RoundedTotals {
        let tax_total = self.tax_total.round_half_up();
        RoundedTotals {
            subtotal: self.subtotal,
            tax_total,
            grand_total: self.subtotal + tax_total,
        }
    }
}

/// Totals rounded half-up to whole paise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoundedTotals {
    pub subtotal: Money,
    pub tax_total: Money,
    pub grand_total: Money,
}

/// Computes subtotal, GST and grand total for a list of line items.
///
/// Pure and deterministic. An empty list yields all-zero totals.
///
/// Prices within `MAX_PRICE_CENTS` on a cart within the cart limits always
/// fit; anything larger fails with `AmountOverflow` instead of wrapping.
///
/// ## Example
/// ```rust
/// use scanpos_core::cart::compute_totals;
///
/// let totals = compute_totals(&[]).unwrap();
/// assert!(totals.subtotal.is_zero());
/// assert_eq!(totals.grand_total.units(), 0);
/// ```
pub fn compute_totals(items: &[LineItem]) -> CoreResult<InvoiceTotals> {
    let mut subtotal = Money::zero();
    let mut tax_total = ExactAmount::zero();
    for item in items {
        subtotal = subtotal
            .checked_add(item.line_subtotal()?)
            .ok_or(CoreError::AmountOverflow("subtotal"))?;
        tax_total = tax_total
            .checked_add(item.line_tax()?)
            .ok_or(CoreError::AmountOverflow("GST total"))?;
    }

    let grand_total = ExactAmount::from_money(subtotal)
        .and_then(|exact| exact.checked_add(tax_total))
        .ok_or(CoreError::AmountOverflow("grand total"))?;

    Ok(InvoiceTotals {
        subtotal,
        tax_total,
        grand_total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::TaxRate;
    use crate::MAX_PRICE_CENTS;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, tax_rate_bps: u32) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price_cents,
            tax_rate_bps,
            stock_quantity: 50,
            min_stock_threshold: 5,
            barcode: format!("000000000000{}", id.len()),
            category: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("mouse", 120_000, 1800),
            product("cable", 45_000, 1800),
            product("pen", 5, 500),
        ]
    }

    #[test]
    fn test_scenario_two_lines_at_18_percent() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_or_update_line_item(&catalog, "mouse", 1).unwrap();
        cart.add_or_update_line_item(&catalog, "cable", 2).unwrap();

        let rounded = cart.totals().unwrap().rounded();
        assert_eq!(rounded.subtotal, Money::from_cents(210_000));
        assert_eq!(rounded.tax_total, Money::from_cents(37_800));
        assert_eq!(rounded.grand_total, Money::from_cents(247_800));
        assert_eq!(rounded.grand_total.to_string(), "2478.00");
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = Cart::new().totals().unwrap();
        assert_eq!(totals, InvoiceTotals::default());
        assert_eq!(totals.rounded(), RoundedTotals::default());
    }

    #[test]
    fn test_grand_total_is_exact_sum() {
        let items = vec![
            LineItem::new("a", "A", Money::from_cents(333), TaxRate::from_bps(1250), 7),
            LineItem::new("b", "B", Money::from_cents(19), TaxRate::from_bps(500), 3),
            LineItem::new("c", "C", Money::from_cents(0), TaxRate::from_bps(2800), 9),
        ];
        let totals = compute_totals(&items).unwrap();

        assert_eq!(
            totals.grand_total,
            ExactAmount::from_money(totals.subtotal).unwrap() + totals.tax_total
        );
        let rounded = totals.rounded();
        assert_eq!(rounded.grand_total, rounded.subtotal + rounded.tax_total);
        assert_eq!(rounded.grand_total, totals.grand_total.round_half_up());
    }

    #[test]
    fn test_largest_valid_cart_fits() {
        let items: Vec<LineItem> = (0..MAX_CART_ITEMS)
            .map(|n| {
                LineItem::new(
                    format!("p{}", n),
                    "Max",
                    Money::from_cents(MAX_PRICE_CENTS),
                    TaxRate::from_bps(10_000),
                    MAX_ITEM_QUANTITY,
                )
            })
            .collect();

        let rounded = compute_totals(&items).unwrap().rounded();
        let expected = MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * MAX_CART_ITEMS as i64;
        assert_eq!(rounded.subtotal, Money::from_cents(expected));
        assert_eq!(rounded.tax_total, Money::from_cents(expected));
        assert_eq!(rounded.grand_total, Money::from_cents(expected * 2));
    }

    #[test]
    fn test_oversized_price_fails_instead_of_wrapping() {
        let line = LineItem::new(
            "big",
            "Big",
            Money::from_cents(100_000_000_000_000),
            TaxRate::from_bps(1800),
            999,
        );
        let err = compute_totals(&[line]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow(_)));

        let line = LineItem::new(
            "bigger",
            "Bigger",
            Money::from_cents(10_000_000_000_000_000),
            TaxRate::from_bps(1800),
            999,
        );
        let err = compute_totals(&[line]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow("line subtotal")));
    }

    #[test]
    fn test_same_product_twice_increments_quantity() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_or_update_line_item(&catalog, "cable", 1).unwrap();
        cart.add_or_update_line_item(&catalog, "cable", 1).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_zero_delta_on_absent_line_inserts_one() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_or_update_line_item(&catalog, "pen", 0).unwrap();
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_or_update_line_item(&catalog, "mouse", 2).unwrap();
        cart.add_or_update_line_item(&catalog, "mouse", -1).unwrap();
        assert_eq!(cart.items()[0].quantity, 1);

        cart.add_or_update_line_item(&catalog, "mouse", -5).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_negative_delta_on_absent_line_is_rejected() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let err = cart
            .add_or_update_line_item(&catalog, "mouse", -1)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { delta: -1, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_product() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let err = cart.add_or_update_line_item(&catalog, "ghost", 1).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_quantity_limit() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_or_update_line_item(&catalog, "pen", MAX_ITEM_QUANTITY)
            .unwrap();

        let err = cart.add_or_update_line_item(&catalog, "pen", 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.items()[0].quantity, MAX_ITEM_QUANTITY);

        let err = Cart::new()
            .add_or_update_line_item(&catalog, "pen", 1000)
            .unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_cart_size_limit() {
        let catalog: HashMap<String, Product> = (0..=MAX_CART_ITEMS)
            .map(|n| {
                let id = format!("p{}", n);
                (id.clone(), product(&id, 100, 0))
            })
            .collect();

        let mut cart = Cart::new();
        for n in 0..MAX_CART_ITEMS {
            cart.add_or_update_line_item(&catalog, &format!("p{}", n), 1)
                .unwrap();
        }

        let err = cart
            .add_or_update_line_item(&catalog, &format!("p{}", MAX_CART_ITEMS), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max: MAX_CART_ITEMS }));
    }

    #[test]
    fn test_line_snapshot_ignores_later_catalog_changes() {
        let mut catalog = catalog();
        let mut cart = Cart::new();
        cart.add_or_update_line_item(&catalog, "cable", 1).unwrap();

        catalog[1].price_cents = 99_999;
        cart.add_or_update_line_item(&catalog, "cable", 1).unwrap();

        assert_eq!(cart.items()[0].unit_price, Money::from_cents(45_000));
    }

    #[test]
    fn test_remove_line_item() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_or_update_line_item(&catalog, "mouse", 3).unwrap();

        assert!(cart.remove_line_item("mouse"));
        assert!(!cart.remove_line_item("mouse"));
        assert!(cart.is_empty());
    }
}
