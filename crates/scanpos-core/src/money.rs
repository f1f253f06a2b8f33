//! # Money Module
//!
//! Provides `Money`, `TaxRate` and `ExactAmount` for handling monetary values
//! safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1200 * 0.18 + 450 * 2 * 0.18 = 377.99999999999994  ❌ WRONG!        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise + Exact Tax                                │
//! │    Prices are i64 paise (1 rupee = 100 paise)                           │
//! │    Tax rates are basis points (1800 = 18%)                              │
//! │    Tax is accumulated in 1/10000 paise, rounded ONCE at the end         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use scanpos_core::money::{ExactAmount, Money, TaxRate};
//!
//! let price = Money::from_cents(120_000); // ₹1200.00
//! let gst = TaxRate::from_bps(1800);      // 18%
//!
//! let tax = ExactAmount::tax_on(price, 1, gst).unwrap();
//! assert_eq!(tax.round_half_up().cents(), 21_600); // ₹216.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

/// Number of exact units in one minor unit (paise).
///
/// A rate in basis points multiplied by an amount in paise lands exactly on
/// this scale, so no precision is lost while summing line taxes.
pub const EXACT_UNITS_PER_CENT: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price_cents ──┬──► LineItem.unit_price ──► LineItem subtotal   │
/// │                        │                                                │
/// │                        └──► Displayed as "₹1200.00" in UI               │
/// │                                                                         │
/// │  Invoice.subtotal ──► GST ──► Invoice.grand_total ──► PaymentOrder      │
/// │                                            │                            │
/// │                                            └──► Customer.total_spent    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use scanpos_core::money::Money;
    ///
    /// let price = Money::from_cents(45_000); // Represents ₹450.00
    /// assert_eq!(price.cents(), 45_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (rupees and paise).
    ///
    /// ## Example
    /// ```rust
    /// use scanpos_core::money::Money;
    ///
    /// let price = Money::from_major_minor(1200, 50); // ₹1200.50
    /// assert_eq!(price.cents(), 120_050);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (paise) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use scanpos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(45_000); // ₹450.00
    /// assert_eq!(unit_price.multiply_quantity(2), Some(Money::from_cents(90_000)));
    /// assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Renders the amount with a currency symbol prefix.
    ///
    /// ## Example
    /// ```rust
    /// use scanpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(247_800).format_with_symbol("₹"), "₹2478.00");
    /// assert_eq!(Money::from_cents(-550).format_with_symbol("₹"), "-₹5.50");
    /// ```
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, symbol, self.major().abs(), self.minor())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering ("2478.00"), the format used in payment
/// payloads and notification texts.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (standard GST slab), 500 bps = 5%
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a whole-number percentage (18 → 18%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        TaxRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate (exempt goods).
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Exact Amount
// =============================================================================

/// A monetary amount in 1/10000 of a minor unit.
///
/// ## Why?
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ROUNDING PER LINE vs ROUNDING ONCE                                     │
/// │                                                                         │
/// │  3 lines of ₹0.05 at 5% GST:                                            │
/// │    per line: round(0.25p) × 3 = 0p        ❌ drifts                     │
/// │    exact:    round(0.75p)     = 1p        ✅                             │
/// │                                                                         │
/// │  price_cents × quantity × bps is ALWAYS an integer on this scale,       │
/// │  so the running GST total never loses precision.                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ExactAmount(i64);

impl ExactAmount {
    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        ExactAmount(0)
    }

    /// Creates an amount directly from exact units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        ExactAmount(units)
    }

    /// Lifts a whole `Money` value onto the exact scale. `None` on overflow.
    #[inline]
    pub const fn from_money(money: Money) -> Option<Self> {
        match money.cents().checked_mul(EXACT_UNITS_PER_CENT) {
            Some(units) => Some(ExactAmount(units)),
            None => None,
        }
    }

    /// Exact GST for `quantity` units at `unit_price`.
    ///
    /// ## Example
    /// ```rust
    /// use scanpos_core::money::{ExactAmount, Money, TaxRate};
    ///
    /// // ₹450.00 × 2 at 18% = ₹162.00
    /// let tax = ExactAmount::tax_on(Money::from_cents(45_000), 2, TaxRate::from_bps(1800));
    /// assert_eq!(tax.unwrap().round_half_up(), Money::from_cents(16_200));
    /// ```
    ///
    /// `None` when the result does not fit the exact scale.
    pub fn tax_on(unit_price: Money, quantity: i64, rate: TaxRate) -> Option<Self> {
        let units = i128::from(unit_price.cents())
            .checked_mul(i128::from(quantity))?
            .checked_mul(i128::from(rate.bps()))?;
        i64::try_from(units).ok().map(ExactAmount)
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: ExactAmount) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(ExactAmount(units)),
            None => None,
        }
    }

    /// Raw exact units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Rounds to the nearest minor unit, halves away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use scanpos_core::money::ExactAmount;
    ///
    /// assert_eq!(ExactAmount::from_units(5_000).round_half_up().cents(), 1);
    /// assert_eq!(ExactAmount::from_units(4_999).round_half_up().cents(), 0);
    /// ```
    pub fn round_half_up(&self) -> Money {
        let half = EXACT_UNITS_PER_CENT / 2;
        let cents = if self.0 >= 0 {
            (self.0 + half) / EXACT_UNITS_PER_CENT
        } else {
            -((-self.0 + half) / EXACT_UNITS_PER_CENT)
        };
        Money::from_cents(cents)
    }

    /// Whether the amount has no fractional minor unit.
    #[inline]
    pub const fn is_whole(&self) -> bool {
        self.0 % EXACT_UNITS_PER_CENT == 0
    }
}

impl Add for ExactAmount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        ExactAmount(self.0 + other.0)
    }
}

impl AddAssign for ExactAmount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for ExactAmount {
    fn sum<I: Iterator<Item = ExactAmount>>(iter: I) -> Self {
        iter.fold(ExactAmount::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
