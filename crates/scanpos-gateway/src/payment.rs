//! # Payment Gateway
//!
//! Order creation and payment verification, behind [`PaymentGateway`].
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Payment Flow                                    │
//! │                                                                         │
//! │  1. Invoice generated ──► create_order(total, "INV-…")                 │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                        PaymentOrder { id: "order_…", qrPayload }       │
//! │                              │                                          │
//! │  2. Customer scans the UPI QR / pays in the checkout widget            │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                        PaymentProof { paymentId, orderId, signature }  │
//! │                              │                                          │
//! │  3. verify_payment(proof)                                              │
//! │       signature == hex(HMAC-SHA256(secret, "<orderId>|<paymentId>"))   │
//! │       ├── match    → Ok(())                                             │
//! │       └── mismatch → Err(Rejected)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info, warn};
use url::Url;

use scanpos_core::{Money, PaymentProof};

use crate::error::{GatewayError, GatewayResult};

type HmacSha256 = Hmac<Sha256>;

const SERVICE: &str = "payment gateway";

/// Length of the random part of generated order and payment ids.
const ID_SUFFIX_LENGTH: usize = 14;

// =============================================================================
// Types
// =============================================================================

/// An order registered with the gateway for one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    /// Gateway order id (`order_…`).
    pub id: String,

    /// Amount to collect, in paise.
    pub amount: Money,

    /// ISO currency code.
    pub currency: String,

    /// Our reference, the invoice number.
    pub receipt: String,

    /// UPI deep link rendered as a QR code at the counter.
    pub qr_payload: String,

    pub created_at: DateTime<Utc>,
}

/// External payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registers an order for `amount` against `receipt` (the invoice number).
    async fn create_order(&self, amount: Money, receipt: &str) -> GatewayResult<PaymentOrder>;

    /// Checks a client-supplied payment proof.
    ///
    /// ## Returns
    /// * `Ok(())` - Payment is genuine
    /// * `Err(GatewayError::Rejected)` - Signature does not match
    /// * `Err(GatewayError::Unavailable)` - Provider could not be asked
    async fn verify_payment(&self, proof: &PaymentProof) -> GatewayResult<()>;
}

// =============================================================================
// Simulated Gateway
// =============================================================================

/// Settings for [`SimulatedGateway`].
#[derive(Debug, Clone)]
pub struct SimulatedGatewayConfig {
    pub key_id: String,
    pub key_secret: String,
    /// Payee VPA placed in the QR payload.
    pub upi_id: String,
    pub business_name: String,
    pub currency_code: String,
}

impl Default for SimulatedGatewayConfig {
    fn default() -> Self {
        SimulatedGatewayConfig {
            key_id: "rzp_test_scanpos".to_string(),
            key_secret: "scanpos-dev-secret".to_string(),
            upi_id: "scanpos@upi".to_string(),
            business_name: "ScanPOS".to_string(),
            currency_code: "INR".to_string(),
        }
    }
}

/// In-process gateway that signs and verifies like a real provider.
///
/// Orders are never stored; a proof is genuine when its signature is the
/// HMAC-SHA256 of `"<order_id>|<payment_id>"` under the key secret.
#[derive(Debug)]
pub struct SimulatedGateway {
    config: SimulatedGatewayConfig,
    available: AtomicBool,
    latency: Option<Duration>,
}

impl SimulatedGateway {
    pub fn new(config: SimulatedGatewayConfig) -> Self {
        info!(key_id = %config.key_id, "Using simulated payment gateway");
        SimulatedGateway {
            config,
            available: AtomicBool::new(true),
            latency: None,
        }
    }

    /// Delays every verification, for exercising caller timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Switches the simulated provider on or off.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Hex HMAC-SHA256 signature for an order/payment pair.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> GatewayResult<String> {
        let mac = self.mac_for(order_id, payment_id)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Produces the proof a customer's successful payment would yield.
    pub fn simulate_payment(&self, order: &PaymentOrder) -> GatewayResult<PaymentProof> {
        let payment_id = random_id("pay_");
        let signature = self.sign(&order.id, &payment_id)?;

        Ok(PaymentProof {
            payment_id,
            order_id: order.id.clone(),
            signature,
        })
    }

    fn mac_for(&self, order_id: &str, payment_id: &str) -> GatewayResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.config.key_secret.as_bytes()).map_err(
            |e| GatewayError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            },
        )?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(mac)
    }

    fn ensure_available(&self) -> GatewayResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::unavailable(SERVICE, "simulated outage"))
        }
    }

    fn qr_payload(&self, amount: Money, receipt: &str) -> GatewayResult<String> {
        let url = Url::parse_with_params(
            "upi://pay",
            &[
                ("pa", self.config.upi_id.as_str()),
                ("pn", self.config.business_name.as_str()),
                ("am", amount.to_string().as_str()),
                ("tr", receipt),
            ],
        )
        .map_err(|e| GatewayError::InvalidResponse {
            service: SERVICE,
            reason: e.to_string(),
        })?;

        Ok(url.to_string())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_order(&self, amount: Money, receipt: &str) -> GatewayResult<PaymentOrder> {
        self.ensure_available()?;

        let order = PaymentOrder {
            id: random_id("order_"),
            amount,
            currency: self.config.currency_code.clone(),
            receipt: receipt.to_string(),
            qr_payload: self.qr_payload(amount, receipt)?,
            created_at: Utc::now(),
        };

        debug!(order_id = %order.id, receipt = %receipt, amount = %amount, "Payment order created");
        Ok(order)
    }

    async fn verify_payment(&self, proof: &PaymentProof) -> GatewayResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.ensure_available()?;

        let provided = hex::decode(&proof.signature)
            .map_err(|_| GatewayError::rejected("signature is not hex"))?;

        self.mac_for(&proof.order_id, &proof.payment_id)?
            .verify_slice(&provided)
            .map_err(|_| {
                warn!(
                    order_id = %proof.order_id,
                    payment_id = %proof.payment_id,
                    "Payment signature mismatch"
                );
                GatewayError::rejected("signature mismatch")
            })?;

        debug!(order_id = %proof.order_id, payment_id = %proof.payment_id, "Payment verified");
        Ok(())
    }
}

fn random_id(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> SimulatedGateway {
        SimulatedGateway::new(SimulatedGatewayConfig {
            upi_id: "corner@upi".to_string(),
            business_name: "Corner Store".to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_create_order() {
        let gw = gateway();
        let order = gw
            .create_order(Money::from_cents(247_800), "INV-1700000000000")
            .await
            .unwrap();

        assert!(order.id.starts_with("order_"));
        assert_eq!(order.id.len(), "order_".len() + ID_SUFFIX_LENGTH);
        assert_eq!(order.amount, Money::from_cents(247_800));
        assert_eq!(order.currency, "INR");
        assert_eq!(order.receipt, "INV-1700000000000");
    }

    #[tokio::test]
    async fn test_qr_payload() {
        let order = gateway()
            .create_order(Money::from_cents(247_800), "INV-1")
            .await
            .unwrap();

        let url = Url::parse(&order.qr_payload).unwrap();
        assert_eq!(url.scheme(), "upi");
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            params,
            vec![
                ("pa".to_string(), "corner@upi".to_string()),
                ("pn".to_string(), "Corner Store".to_string()),
                ("am".to_string(), "2478.00".to_string()),
                ("tr".to_string(), "INV-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_simulated_payment_verifies() {
        let gw = gateway();
        let order = gw.create_order(Money::from_cents(100), "INV-1").await.unwrap();
        let proof = gw.simulate_payment(&order).unwrap();

        assert!(proof.payment_id.starts_with("pay_"));
        assert_eq!(proof.order_id, order.id);
        gw.verify_payment(&proof).await.unwrap();
    }

    #[tokio::test]
    async fn test_tampered_signature_rejected() {
        let gw = gateway();
        let signature = gw.sign("order_a", "pay_a").unwrap();

        let wrong_payment = PaymentProof {
            payment_id: "pay_b".to_string(),
            order_id: "order_a".to_string(),
            signature: signature.clone(),
        };
        let err = gw.verify_payment(&wrong_payment).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));

        let not_hex = PaymentProof {
            payment_id: "pay_a".to_string(),
            order_id: "order_a".to_string(),
            signature: "zz-not-hex".to_string(),
        };
        let err = gw.verify_payment(&not_hex).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let a = gateway().sign("order_a", "pay_a").unwrap();
        let b = SimulatedGateway::new(SimulatedGatewayConfig {
            key_secret: "another-secret".to_string(),
            ..Default::default()
        })
        .sign("order_a", "pay_a")
        .unwrap();

        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_outage() {
        let gw = gateway();
        let proof = PaymentProof {
            payment_id: "pay_a".to_string(),
            order_id: "order_a".to_string(),
            signature: gw.sign("order_a", "pay_a").unwrap(),
        };

        gw.set_available(false);
        let err = gw.verify_payment(&proof).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable { .. }));
        assert!(gw.create_order(Money::from_cents(1), "INV-1").await.is_err());

        gw.set_available(true);
        gw.verify_payment(&proof).await.unwrap();
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = PaymentOrder {
            id: "order_x".to_string(),
            amount: Money::from_cents(500),
            currency: "INR".to_string(),
            receipt: "INV-1".to_string(),
            qr_payload: "upi://pay?am=5.00".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["qrPayload"], "upi://pay?am=5.00");
        assert_eq!(json["amount"], 500);
    }
}
