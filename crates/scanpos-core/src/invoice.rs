//! # Invoice Lifecycle
//!
//! Turns a cart into a pending invoice and drives its status afterwards.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   finalize_invoice()                                                    │
//! │         │                                                               │
//! │         ▼            mark_paid()                                        │
//! │   ┌───────────┐ ─────────────────────────► ┌───────────┐               │
//! │   │  Pending  │                            │   Paid    │ (terminal)    │
//! │   └───────────┘ ─────────────┐             └───────────┘               │
//! │     ▲       │                │ cancel() /                              │
//! │     │       │                │ record_failed_attempt(final = true)     │
//! │     └───────┘                ▼                                          │
//! │  record_failed_attempt  ┌───────────┐                                  │
//! │  (final = false)        │ Cancelled │ (terminal)                       │
//! │                         └───────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition out of a terminal state fails with
//! `CoreError::InvalidInvoiceStatus`.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::types::{CustomerInfo, Invoice, InvoiceStatus};
use crate::validation::validate_customer_info;
use crate::INVOICE_NUMBER_PREFIX;

// =============================================================================
// Payment Proof
// =============================================================================

/// What the payment gateway hands the client after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentProof {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
}

// =============================================================================
// Finalization
// =============================================================================

/// Builds a pending invoice from a cart.
///
/// ## Preconditions
/// - Cart has at least one line
/// - Customer name and phone are non-empty, email well-formed when present
///
/// ## Side Effects
/// None. Persisting the invoice is the caller's job.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use scanpos_core::{finalize_invoice, Cart, CoreError, CustomerInfo};
///
/// let info = CustomerInfo { name: "Asha".into(), phone: "9876543210".into(), email: None };
/// let err = finalize_invoice(&Cart::new(), info, "INV-1".into(), Utc::now()).unwrap_err();
/// assert!(matches!(err, CoreError::EmptyCart));
/// ```
pub fn finalize_invoice(
    cart: &Cart,
    customer: CustomerInfo,
    invoice_number: String,
    now: DateTime<Utc>,
) -> CoreResult<Invoice> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let customer = validate_customer_info(
        &customer.name,
        &customer.phone,
        customer.email.as_deref(),
    )?;

    let totals = cart.totals()?.rounded();

    Ok(Invoice {
        id: Uuid::new_v4().to_string(),
        invoice_number,
        customer,
        items: cart.items().to_vec(),
        subtotal: totals.subtotal,
        tax_total: totals.tax_total,
        grand_total: totals.grand_total,
        status: InvoiceStatus::Pending,
        failed_attempts: 0,
        payment_order_id: None,
        payment_id: None,
        created_at: now,
        updated_at: now,
        paid_at: None,
    })
}

// =============================================================================
// Status Transitions
// =============================================================================

impl Invoice {
    fn ensure_pending(&self, operation: &'static str) -> CoreResult<()> {
        if self.status != InvoiceStatus::Pending {
            return Err(CoreError::InvalidInvoiceStatus {
                invoice_number: self.invoice_number.clone(),
                status: self.status,
                operation,
            });
        }
        Ok(())
    }

    /// Records the gateway order created for this invoice.
    pub fn attach_payment_order(&mut self, order_id: impl Into<String>, at: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_pending("attach a payment order")?;
        self.payment_order_id = Some(order_id.into());
        self.updated_at = at;
        Ok(())
    }

    /// Pending → Paid.
    pub fn mark_paid(&mut self, payment_id: impl Into<String>, at: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_pending("mark as paid")?;
        self.status = InvoiceStatus::Paid;
        self.payment_id = Some(payment_id.into());
        self.paid_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Pending → Cancelled.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_pending("cancel")?;
        self.status = InvoiceStatus::Cancelled;
        self.updated_at = at;
        Ok(())
    }

    /// Counts a failed verification.
    ///
    /// Stays `Pending` while the caller intends to retry, becomes
    /// `Cancelled` on the final attempt.
    ///
    /// ## Returns
    /// The status after the transition.
    pub fn record_failed_attempt(&mut self, final_attempt: bool, at: DateTime<Utc>) -> CoreResult<InvoiceStatus> {
        self.ensure_pending("record a failed payment")?;
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.updated_at = at;
        if final_attempt {
            self.status = InvoiceStatus::Cancelled;
        }
        Ok(self.status)
    }
}

// =============================================================================
// Invoice Numbers
// =============================================================================

/// Produces `INV-<unix millis>` invoice numbers.
///
/// ## Monotonic Bump
/// ```text
/// clock: 1700000000000 → INV-1700000000000
/// clock: 1700000000000 → INV-1700000000001   (same millisecond)
/// clock: 1699999999990 → INV-1700000000002   (clock went backwards)
/// clock: 1700000000500 → INV-1700000000500
/// ```
///
/// Uniqueness within one process is guaranteed; across processes the store's
/// unique index is the final arbiter and callers regenerate on collision.
#[derive(Debug, Default)]
pub struct InvoiceNumberGenerator {
    last: AtomicI64,
}

impl InvoiceNumberGenerator {
    pub fn new() -> Self {
        InvoiceNumberGenerator {
            last: AtomicI64::new(0),
        }
    }

    /// Next number for the current wall clock.
    pub fn next_number(&self) -> String {
        self.next_at(Utc::now())
    }

    /// Next number for a given clock reading.
    pub fn next_at(&self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = millis.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return format!("{}{}", INVOICE_NUMBER_PREFIX, candidate),
                Err(actual) => last = actual,
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
