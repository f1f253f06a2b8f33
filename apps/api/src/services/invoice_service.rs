//! Invoice service.
//!
//! Orchestrates the checkout: cart → invoice → payment order → verification
//! → settlement → notifications.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    confirm_payment                                      │
//! │                                                                         │
//! │  load invoice ──► terminal? ──────────────────────────► 409 Conflict   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  proof.orderId == invoice.paymentOrderId ?                             │
//! │       │ no ───────────────────────────────┐                             │
//! │       ▼ yes                               │                             │
//! │  timeout(verify_payment)                  │                             │
//! │       ├── Ok          ──► settle (tx) ──► dispatch ──► Confirmed       │
//! │       ├── Rejected    ────────────────────┤                             │
//! │       ├── timed out   ────────────────────┤                             │
//! │       └── Unavailable ──► 502             ▼                             │
//! │                             record_failed_attempt ──► Rejected         │
//! │                             (Cancelled when finalAttempt)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use scanpos_core::validation::{validate_customer_info, validate_quantity};
use scanpos_core::{
    finalize_invoice, Cart, CoreError, Customer, CustomerInfo, Invoice, InvoiceNumberGenerator,
    InvoiceStatus, Money, PaymentProof, Product, RoundedTotals, ValidationError,
};
use scanpos_db::Store;
use scanpos_gateway::{
    GatewayError, NotificationDispatcher, NotificationReceipt, PaymentGateway, PaymentOrder,
};

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    pub customer_email: Option<String>,
    #[serde(default)]
    pub items: Vec<InvoiceItemRequest>,
    /// Client-computed figures in paise; checked against the server's when sent.
    pub subtotal: Option<i64>,
    pub gst: Option<i64>,
    pub total: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub final_attempt: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInvoice {
    pub invoice: Invoice,
    pub payment_order: PaymentOrder,
}

/// Result of a verification attempt that reached a verdict.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    Confirmed {
        invoice: Invoice,
        customer: Customer,
        notifications: Vec<NotificationReceipt>,
    },
    /// The invoice stays pending, or is cancelled on the final attempt.
    Rejected { invoice: Invoice, reason: String },
}

// =============================================================================
// Service
// =============================================================================

pub struct InvoiceService {
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    dispatcher: Arc<NotificationDispatcher>,
    numbers: InvoiceNumberGenerator,
    number_attempts: u32,
    gateway_timeout: Duration,
}

impl InvoiceService {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: Arc<NotificationDispatcher>,
        number_attempts: u32,
        gateway_timeout: Duration,
    ) -> Self {
        InvoiceService {
            store,
            gateway,
            dispatcher,
            numbers: InvoiceNumberGenerator::new(),
            number_attempts,
            gateway_timeout,
        }
    }

    /// Replaces the invoice number source.
    pub fn with_number_generator(mut self, numbers: InvoiceNumberGenerator) -> Self {
        self.numbers = numbers;
        self
    }

    /// Builds a pending invoice from the request and opens a payment order.
    pub async fn generate(&self, request: GenerateInvoiceRequest) -> ApiResult<GeneratedInvoice> {
        if request.items.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        let customer = validate_customer_info(
            &request.customer_name,
            &request.customer_phone,
            request.customer_email.as_deref(),
        )?;
        for item in &request.items {
            validate_quantity(item.quantity)?;
        }

        let cart = self.build_cart(&request.items).await?;
        let totals = cart.totals()?.rounded();
        check_client_totals(&request, &totals)?;

        self.allocate_and_insert(&cart, customer).await
    }

    async fn build_cart(&self, items: &[InvoiceItemRequest]) -> ApiResult<Cart> {
        let mut ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let catalog: HashMap<String, Product> = self
            .store
            .get_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut cart = Cart::new();
        for item in items {
            cart.add_or_update_line_item(&catalog, &item.product_id, item.quantity)?;
        }
        Ok(cart)
    }

    /// Claims a free invoice number, then opens the payment order for it.
    ///
    /// A number is abandoned when the store already has it, or when the
    /// insert loses a race on the unique index. The gateway only sees numbers
    /// that were claimed.
    async fn allocate_and_insert(
        &self,
        cart: &Cart,
        customer: CustomerInfo,
    ) -> ApiResult<GeneratedInvoice> {
        for attempt in 1..=self.number_attempts {
            let number = self.numbers.next_number();
            if self.store.invoice_number_exists(&number).await? {
                debug!(invoice_number = %number, attempt, "Invoice number taken, regenerating");
                continue;
            }

            let mut invoice = finalize_invoice(cart, customer.clone(), number, Utc::now())?;
            match self.store.insert_invoice(&invoice).await {
                Ok(()) => {}
                Err(e) if e.is_unique_violation_on("invoice_number") => {
                    warn!(
                        invoice_number = %invoice.invoice_number,
                        attempt,
                        "Invoice number collided on insert, regenerating"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            let payment_order = match self.open_order(&invoice).await {
                Ok(order) => order,
                Err(e) => {
                    self.abandon(&mut invoice).await;
                    return Err(e);
                }
            };
            invoice.attach_payment_order(payment_order.id.clone(), Utc::now())?;
            self.store
                .save_invoice_state(&invoice, InvoiceStatus::Pending)
                .await?;

            info!(
                invoice_number = %invoice.invoice_number,
                total = %invoice.grand_total,
                items = invoice.items.len(),
                order_id = %payment_order.id,
                "Invoice generated"
            );
            return Ok(GeneratedInvoice {
                invoice,
                payment_order,
            });
        }

        Err(CoreError::InvoiceNumberConflict {
            attempts: self.number_attempts,
        }
        .into())
    }

    async fn open_order(&self, invoice: &Invoice) -> ApiResult<PaymentOrder> {
        let order = self
            .gateway
            .create_order(invoice.grand_total, &invoice.invoice_number);
        match tokio::time::timeout(self.gateway_timeout, order).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(GatewayError::unavailable(
                "payment gateway",
                format!(
                    "order creation timed out after {} ms",
                    self.gateway_timeout.as_millis()
                ),
            )
            .into()),
        }
    }

    /// Cancels a claimed invoice whose payment order could not be opened.
    async fn abandon(&self, invoice: &mut Invoice) {
        if invoice.cancel(Utc::now()).is_err() {
            return;
        }
        match self
            .store
            .save_invoice_state(invoice, InvoiceStatus::Pending)
            .await
        {
            Ok(()) => warn!(
                invoice_number = %invoice.invoice_number,
                "Invoice cancelled, payment order not opened"
            ),
            Err(e) => warn!(
                invoice_number = %invoice.invoice_number,
                error = %e,
                "Failed to cancel invoice without payment order"
            ),
        }
    }

    /// Verifies a payment proof and settles the invoice.
    pub async fn confirm_payment(&self, request: VerifyPaymentRequest) -> ApiResult<PaymentOutcome> {
        for (field, value) in [
            ("invoiceNumber", &request.invoice_number),
            ("paymentId", &request.payment_id),
            ("orderId", &request.order_id),
            ("signature", &request.signature),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: field.to_string(),
                }
                .into());
            }
        }

        let mut invoice = self.get(&request.invoice_number).await?;
        if invoice.status.is_terminal() {
            return Err(CoreError::InvalidInvoiceStatus {
                invoice_number: invoice.invoice_number,
                status: invoice.status,
                operation: "verify a payment",
            }
            .into());
        }

        let proof = PaymentProof {
            payment_id: request.payment_id.trim().to_string(),
            order_id: request.order_id.trim().to_string(),
            signature: request.signature.trim().to_string(),
        };

        if let Err(reason) = self.verify(&invoice, &proof).await? {
            let now = Utc::now();
            let status = invoice.record_failed_attempt(request.final_attempt, now)?;
            self.store
                .save_invoice_state(&invoice, InvoiceStatus::Pending)
                .await?;

            warn!(
                invoice_number = %invoice.invoice_number,
                attempts = invoice.failed_attempts,
                status = %status,
                reason = %reason,
                "Payment verification failed"
            );
            return Ok(PaymentOutcome::Rejected { invoice, reason });
        }

        invoice.mark_paid(proof.payment_id.clone(), Utc::now())?;
        if invoice.payment_order_id.is_none() {
            invoice.payment_order_id = Some(proof.order_id.clone());
        }
        let customer = self.store.settle_invoice(&invoice).await?.into_customer();

        info!(
            invoice_number = %invoice.invoice_number,
            payment_id = %proof.payment_id,
            customer_id = %customer.id,
            "Payment confirmed"
        );

        let notifications = self.dispatcher.dispatch(&invoice).await;

        Ok(PaymentOutcome::Confirmed {
            invoice,
            customer,
            notifications,
        })
    }

    /// `Ok(Ok(()))` genuine, `Ok(Err(reason))` refused, `Err` outage.
    async fn verify(
        &self,
        invoice: &Invoice,
        proof: &PaymentProof,
    ) -> ApiResult<Result<(), String>> {
        if let Some(expected) = &invoice.payment_order_id {
            if expected != &proof.order_id {
                return Ok(Err(format!(
                    "order {} does not belong to invoice {}",
                    proof.order_id, invoice.invoice_number
                )));
            }
        }

        match tokio::time::timeout(self.gateway_timeout, self.gateway.verify_payment(proof)).await
        {
            Ok(Ok(())) => Ok(Ok(())),
            Ok(Err(GatewayError::Rejected(reason))) => Ok(Err(reason)),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(Err(format!(
                "verification timed out after {} ms",
                self.gateway_timeout.as_millis()
            ))),
        }
    }

    /// Pending → Cancelled.
    pub async fn cancel(&self, invoice_number: &str) -> ApiResult<Invoice> {
        let mut invoice = self.get(invoice_number).await?;
        invoice.cancel(Utc::now())?;
        self.store
            .save_invoice_state(&invoice, InvoiceStatus::Pending)
            .await?;

        info!(invoice_number = %invoice.invoice_number, "Invoice cancelled");
        Ok(invoice)
    }

    pub async fn get(&self, invoice_number: &str) -> ApiResult<Invoice> {
        self.store
            .get_invoice(invoice_number)
            .await?
            .ok_or_else(|| ApiError::not_found("Invoice", invoice_number))
    }

    /// Newest first, optionally filtered by `pending` / `paid` / `cancelled`.
    pub async fn list(&self, status: Option<&str>) -> ApiResult<Vec<Invoice>> {
        let status = match status {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<InvoiceStatus>()?),
            _ => None,
        };
        Ok(self.store.list_invoices(status).await?)
    }
}

fn check_client_totals(request: &GenerateInvoiceRequest, totals: &RoundedTotals) -> ApiResult<()> {
    for (field, claimed, computed) in [
        ("subtotal", request.subtotal, totals.subtotal),
        ("gst", request.gst, totals.tax_total),
        ("total", request.total, totals.grand_total),
    ] {
        if let Some(claimed) = claimed {
            if Money::from_cents(claimed) != computed {
                return Err(ValidationError::Mismatch {
                    field: field.to_string(),
                    expected: computed.cents().to_string(),
                    actual: claimed.to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
