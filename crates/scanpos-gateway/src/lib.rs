//! # scanpos-gateway: External Collaborators for ScanPOS
//!
//! Payment provider and customer messaging, each behind a trait so the API
//! can swap a real provider for the simulated one without touching
//! business code.
//!
//! ## Module Organization
//!
//! - [`payment`] - `PaymentGateway`, `SimulatedGateway`, `PaymentOrder`
//! - [`notify`] - `Notifier`, logging senders, `NotificationDispatcher`
//! - [`error`] - `GatewayError`
//!
//! ## Usage
//!
//! ```rust
//! use scanpos_core::Money;
//! use scanpos_gateway::{PaymentGateway, SimulatedGateway, SimulatedGatewayConfig};
//!
//! # tokio_test_block(async {
//! let gateway = SimulatedGateway::new(SimulatedGatewayConfig::default());
//! let order = gateway.create_order(Money::from_cents(247_800), "INV-1").await.unwrap();
//! let proof = gateway.simulate_payment(&order).unwrap();
//! assert!(gateway.verify_payment(&proof).await.is_ok());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod notify;
pub mod payment;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{GatewayError, GatewayResult};
pub use notify::{
    invoice_pdf_url, Channel, LoggingEmailSender, LoggingWhatsAppSender, Notification,
    NotificationDispatcher, NotificationReceipt, Notifier,
};
pub use payment::{PaymentGateway, PaymentOrder, SimulatedGateway, SimulatedGatewayConfig};
