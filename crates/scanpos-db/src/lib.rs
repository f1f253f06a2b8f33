//! # scanpos-db: Storage Layer for ScanPOS
//!
//! This crate owns every read and write of ScanPOS data. Callers talk to the
//! [`Store`] trait; two implementations sit behind it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanPOS Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /invoice/generate)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceService ── Arc<dyn Store> ──┐                                   │
//! │                                     │                                   │
//! │  ┌──────────────────────────────────┼──────────────────────────────┐   │
//! │  │                     scanpos-db (THIS CRATE)                     │   │
//! │  │                                  │                              │   │
//! │  │        ┌─────────────────────────┴───────────────┐              │   │
//! │  │        ▼                                         ▼              │   │
//! │  │   ┌───────────────┐                     ┌───────────────┐     │   │
//! │  │   │   Database    │                     │  MemoryStore  │     │   │
//! │  │   │   (pool.rs)   │                     │  (memory.rs)  │     │   │
//! │  │   │ SqlitePool +  │                     │ RwLock<Inner> │     │   │
//! │  │   │ repositories  │                     │  tests/demos  │     │   │
//! │  │   └───────┬───────┘                     └───────────────┘     │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite (WAL)  products · customers · invoices · users         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Storage traits
//! - [`pool`] - Connection pool creation and configuration
//! - [`repository`] - SQLite repositories and the `Store` impl for `Database`
//! - [`memory`] - In-memory `Store`
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanpos_db::{Database, DbConfig, Store};
//!
//! let db = Database::new(DbConfig::new("scanpos.db")).await?;
//! let product = db.get_product_by_barcode("8901234567890").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use store::{CustomerStore, DashboardStore, InvoiceStore, ProductStore, Store, UserStore};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;

// =============================================================================
// Unit Tests
// =============================================================================

/// Behavior both stores must share. Every scenario runs against SQLite
/// (in-memory) and against [`MemoryStore`].
#[cfg(test)]
mod contract_tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use scanpos_core::{
        CustomerInfo, CustomerStatus, Invoice, InvoiceStatus, LineItem, Money, Product, TaxRate,
        User, UserRole,
    };

    async fn stores() -> Vec<(&'static str, Box<dyn Store>)> {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database");
        vec![
            ("sqlite", Box::new(db) as Box<dyn Store>),
            ("memory", Box::new(MemoryStore::new()) as Box<dyn Store>),
        ]
    }

    fn ts(minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, minute, 0).unwrap()
    }

    fn product(id: &str, name: &str, barcode: &str, stock: i64, threshold: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price_cents: 50_000,
            tax_rate_bps: 1800,
            stock_quantity: stock,
            min_stock_threshold: threshold,
            barcode: barcode.to_string(),
            category: None,
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    fn invoice(number: &str, phone: &str, email: Option<&str>, total: i64, at: u32) -> Invoice {
        let item = LineItem::new(
            "p1".to_string(),
            "Widget".to_string(),
            Money::from_cents(total),
            TaxRate::zero(),
            1,
        );
        Invoice {
            id: format!("id-{}", number),
            invoice_number: number.to_string(),
            customer: CustomerInfo {
                name: "Asha".to_string(),
                phone: phone.to_string(),
                email: email.map(str::to_string),
            },
            items: vec![item],
            subtotal: Money::from_cents(total),
            tax_total: Money::zero(),
            grand_total: Money::from_cents(total),
            status: InvoiceStatus::Pending,
            failed_attempts: 0,
            payment_order_id: None,
            payment_id: None,
            created_at: ts(at),
            updated_at: ts(at),
            paid_at: None,
        }
    }

    fn paid(mut invoice: Invoice, at: u32) -> Invoice {
        invoice.status = InvoiceStatus::Paid;
        invoice.payment_id = Some(format!("pay_{}", invoice.invoice_number));
        invoice.paid_at = Some(ts(at));
        invoice.updated_at = ts(at);
        invoice
    }

    #[tokio::test]
    async fn test_product_crud_and_barcode_lookup() {
        for (name, store) in stores().await {
            store.insert_product(&product("p1", "Tea", "111", 20, 5)).await.unwrap();
            store.insert_product(&product("p2", "Atta", "222", 20, 5)).await.unwrap();

            let found = store.get_product_by_barcode("222").await.unwrap();
            assert_eq!(found.map(|p| p.id), Some("p2".to_string()), "{}", name);
            assert!(store.get_product_by_barcode("999").await.unwrap().is_none(), "{}", name);

            let listed: Vec<String> = store
                .list_products()
                .await
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect();
            assert_eq!(listed, vec!["Atta", "Tea"], "{}", name);

            let mut tea = store.get_product("p1").await.unwrap().unwrap();
            tea.price_cents = 60_000;
            tea.updated_at = ts(5);
            store.update_product(&tea).await.unwrap();
            let reloaded = store.get_product("p1").await.unwrap().unwrap();
            assert_eq!(reloaded.price_cents, 60_000, "{}", name);
            assert_eq!(reloaded.created_at, ts(0), "{}", name);

            store.delete_product("p2").await.unwrap();
            assert!(store.get_product("p2").await.unwrap().is_none(), "{}", name);
            assert!(
                matches!(store.delete_product("p2").await, Err(DbError::NotFound { .. })),
                "{}",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        for (name, store) in stores().await {
            store.insert_product(&product("p1", "Tea", "111", 20, 5)).await.unwrap();

            let err = store
                .insert_product(&product("p2", "Coffee", "111", 20, 5))
                .await
                .unwrap_err();
            assert!(err.is_unique_violation_on("barcode"), "{}: {:?}", name, err);

            store.insert_product(&product("p2", "Coffee", "222", 20, 5)).await.unwrap();
            let mut coffee = store.get_product("p2").await.unwrap().unwrap();
            coffee.barcode = "111".to_string();
            let err = store.update_product(&coffee).await.unwrap_err();
            assert!(err.is_unique_violation_on("barcode"), "{}: {:?}", name, err);
        }
    }

    #[tokio::test]
    async fn test_get_products_skips_unknown_ids() {
        for (name, store) in stores().await {
            store.insert_product(&product("p1", "Tea", "111", 20, 5)).await.unwrap();
            store.insert_product(&product("p2", "Atta", "222", 20, 5)).await.unwrap();

            let ids = vec!["p1".to_string(), "ghost".to_string(), "p2".to_string()];
            let mut found: Vec<String> = store
                .get_products(&ids)
                .await
                .unwrap()
                .into_iter()
                .map(|p| p.id)
                .collect();
            found.sort();
            assert_eq!(found, vec!["p1", "p2"], "{}", name);
            assert!(store.get_products(&[]).await.unwrap().is_empty(), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_invoice_number_is_unique() {
        for (name, store) in stores().await {
            store.insert_invoice(&invoice("INV-1", "9876543210", None, 1000, 0)).await.unwrap();
            assert!(store.invoice_number_exists("INV-1").await.unwrap(), "{}", name);
            assert!(!store.invoice_number_exists("INV-2").await.unwrap(), "{}", name);

            let mut dup = invoice("INV-1", "9876543210", None, 1000, 1);
            dup.id = "another-id".to_string();
            let err = store.insert_invoice(&dup).await.unwrap_err();
            assert!(err.is_unique_violation_on("invoice_number"), "{}: {:?}", name, err);
        }
    }

    #[tokio::test]
    async fn test_invoice_roundtrip_keeps_items() {
        for (name, store) in stores().await {
            let original = invoice("INV-7", "9876543210", Some("asha@example.com"), 2478, 3);
            store.insert_invoice(&original).await.unwrap();

            let loaded = store.get_invoice("INV-7").await.unwrap().unwrap();
            assert_eq!(loaded, original, "{}", name);
            assert!(store.get_invoice("INV-404").await.unwrap().is_none(), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_list_invoices_newest_first_with_filter() {
        for (name, store) in stores().await {
            store.insert_invoice(&invoice("INV-1", "9000000001", None, 100, 1)).await.unwrap();
            store.insert_invoice(&invoice("INV-2", "9000000002", None, 200, 2)).await.unwrap();
            store.insert_invoice(&invoice("INV-3", "9000000003", None, 300, 3)).await.unwrap();

            let first = store.get_invoice("INV-1").await.unwrap().unwrap();
            store.settle_invoice(&paid(first, 10)).await.unwrap();

            let all: Vec<String> = store
                .list_invoices(None)
                .await
                .unwrap()
                .into_iter()
                .map(|i| i.invoice_number)
                .collect();
            assert_eq!(all, vec!["INV-3", "INV-2", "INV-1"], "{}", name);

            let pending = store.list_invoices(Some(InvoiceStatus::Pending)).await.unwrap();
            assert_eq!(pending.len(), 2, "{}", name);
            let paid_only = store.list_invoices(Some(InvoiceStatus::Paid)).await.unwrap();
            assert_eq!(paid_only.len(), 1, "{}", name);
            assert_eq!(paid_only[0].invoice_number, "INV-1", "{}", name);
        }
    }

    #[tokio::test]
    async fn test_settle_creates_then_updates_customer() {
        for (name, store) in stores().await {
            let first = invoice("INV-1", "9876543210", Some("asha@example.com"), 2478, 0);
            store.insert_invoice(&first).await.unwrap();
            let plan = store.settle_invoice(&paid(first, 1)).await.unwrap();
            assert!(plan.is_create(), "{}", name);

            let second = invoice("INV-2", "9876543210", None, 1000, 2);
            store.insert_invoice(&second).await.unwrap();
            let plan = store.settle_invoice(&paid(second, 3)).await.unwrap();
            assert!(!plan.is_create(), "{}", name);

            let customer = store.get_customer_by_phone("9876543210").await.unwrap().unwrap();
            assert_eq!(customer.total_spent_cents, 3478, "{}", name);
            assert_eq!(customer.last_purchase_at, Some(ts(3)), "{}", name);
            assert_eq!(customer.email.as_deref(), Some("asha@example.com"), "{}", name);
            assert_eq!(customer.status, CustomerStatus::Active, "{}", name);
            assert_eq!(store.list_customers().await.unwrap().len(), 1, "{}", name);

            let stored = store.get_invoice("INV-1").await.unwrap().unwrap();
            assert_eq!(stored.status, InvoiceStatus::Paid, "{}", name);
            assert_eq!(stored.paid_at, Some(ts(1)), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_settle_matches_customer_by_email() {
        for (name, store) in stores().await {
            let first = invoice("INV-1", "9000000001", Some("asha@example.com"), 500, 0);
            store.insert_invoice(&first).await.unwrap();
            store.settle_invoice(&paid(first, 1)).await.unwrap();

            // New phone, same email: the existing record is updated
            let second = invoice("INV-2", "9000000002", Some("asha@example.com"), 700, 2);
            store.insert_invoice(&second).await.unwrap();
            let plan = store.settle_invoice(&paid(second, 3)).await.unwrap();
            assert!(!plan.is_create(), "{}", name);

            let customers = store.list_customers().await.unwrap();
            assert_eq!(customers.len(), 1, "{}", name);
            assert_eq!(customers[0].total_spent_cents, 1200, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_settle_twice_conflicts_without_double_count() {
        for (name, store) in stores().await {
            let pending = invoice("INV-1", "9876543210", None, 2478, 0);
            store.insert_invoice(&pending).await.unwrap();

            let settled = paid(pending, 1);
            store.settle_invoice(&settled).await.unwrap();
            let err = store.settle_invoice(&settled).await.unwrap_err();
            assert!(matches!(err, DbError::Conflict(_)), "{}: {:?}", name, err);

            let customer = store.get_customer_by_phone("9876543210").await.unwrap().unwrap();
            assert_eq!(customer.total_spent_cents, 2478, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_settle_unknown_invoice_is_not_found() {
        for (name, store) in stores().await {
            let ghost = paid(invoice("INV-404", "9876543210", None, 100, 0), 1);
            let err = store.settle_invoice(&ghost).await.unwrap_err();
            assert!(matches!(err, DbError::NotFound { .. }), "{}: {:?}", name, err);
            assert!(store.list_customers().await.unwrap().is_empty(), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_save_state_is_guarded_by_expected_status() {
        for (name, store) in stores().await {
            let mut inv = invoice("INV-1", "9876543210", None, 100, 0);
            store.insert_invoice(&inv).await.unwrap();

            inv.failed_attempts = 1;
            inv.payment_order_id = Some("order_1".to_string());
            store.save_invoice_state(&inv, InvoiceStatus::Pending).await.unwrap();

            inv.status = InvoiceStatus::Cancelled;
            inv.updated_at = ts(4);
            store.save_invoice_state(&inv, InvoiceStatus::Pending).await.unwrap();

            let stored = store.get_invoice("INV-1").await.unwrap().unwrap();
            assert_eq!(stored.status, InvoiceStatus::Cancelled, "{}", name);
            assert_eq!(stored.failed_attempts, 1, "{}", name);
            assert_eq!(stored.payment_order_id.as_deref(), Some("order_1"), "{}", name);

            // Cancelled is terminal; a stale pending write must not land
            let err = store.save_invoice_state(&inv, InvoiceStatus::Pending).await.unwrap_err();
            assert!(matches!(err, DbError::Conflict(_)), "{}: {:?}", name, err);

            let ghost = invoice("INV-404", "9876543210", None, 100, 0);
            let err = store
                .save_invoice_state(&ghost, InvoiceStatus::Pending)
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::NotFound { .. }), "{}: {:?}", name, err);
        }
    }

    #[tokio::test]
    async fn test_customer_phone_unique_and_details_update() {
        for (name, store) in stores().await {
            let info = CustomerInfo {
                name: "Asha".to_string(),
                phone: "9876543210".to_string(),
                email: None,
            };
            let mut customer = scanpos_core::new_customer(&info, ts(0));
            store.insert_customer(&customer).await.unwrap();

            let clash = scanpos_core::new_customer(&info, ts(1));
            let err = store.insert_customer(&clash).await.unwrap_err();
            assert!(err.is_unique_violation_on("phone"), "{}: {:?}", name, err);

            customer.name = "Asha Rao".to_string();
            customer.status = CustomerStatus::Inactive;
            customer.total_spent_cents = 999_999;
            customer.updated_at = ts(2);
            store.update_customer(&customer).await.unwrap();

            let stored = store.get_customer(&customer.id).await.unwrap().unwrap();
            assert_eq!(stored.name, "Asha Rao", "{}", name);
            assert_eq!(stored.status, CustomerStatus::Inactive, "{}", name);
            // Spend is only ever changed by settlement
            assert_eq!(stored.total_spent_cents, 0, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_users_unique_by_email() {
        for (name, store) in stores().await {
            let user = User {
                id: "u1".to_string(),
                name: "Owner".to_string(),
                email: "owner@shop.in".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role: UserRole::Admin,
                business_name: Some("Corner Store".to_string()),
                business_address: None,
                business_phone: None,
                business_gst: None,
                created_at: ts(0),
            };
            store.insert_user(&user).await.unwrap();

            let loaded = store.get_user_by_email("owner@shop.in").await.unwrap().unwrap();
            assert_eq!(loaded.password_hash, user.password_hash, "{}", name);
            assert_eq!(loaded.role, UserRole::Admin, "{}", name);

            let mut again = user.clone();
            again.id = "u2".to_string();
            let err = store.insert_user(&again).await.unwrap_err();
            assert!(err.is_unique_violation_on("email"), "{}: {:?}", name, err);
        }
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        for (name, store) in stores().await {
            store.insert_product(&product("p1", "Tea", "111", 50, 10)).await.unwrap();
            store.insert_product(&product("p2", "Atta", "222", 10, 10)).await.unwrap();
            store.insert_product(&product("p3", "Salt", "333", 0, 5)).await.unwrap();

            let a = invoice("INV-1", "9000000001", None, 2478, 0);
            let b = invoice("INV-2", "9000000002", None, 1000, 1);
            let c = invoice("INV-3", "9000000003", None, 500, 2);
            for inv in [&a, &b, &c] {
                store.insert_invoice(inv).await.unwrap();
            }
            store.settle_invoice(&paid(a, 5)).await.unwrap();
            let mut cancelled = c.clone();
            cancelled.status = InvoiceStatus::Cancelled;
            cancelled.updated_at = c.updated_at + Duration::minutes(1);
            store.save_invoice_state(&cancelled, InvoiceStatus::Pending).await.unwrap();

            let stats = store.dashboard_stats().await.unwrap();
            assert_eq!(stats.total_sales, Money::from_cents(2478), "{}", name);
            assert_eq!(stats.total_invoices, 3, "{}", name);
            assert_eq!(stats.pending_payments, 1, "{}", name);
            assert_eq!(stats.low_stock_items, 2, "{}", name);
            assert_eq!(stats.active_customers, 1, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        for (name, store) in stores().await {
            assert!(store.health_check().await, "{}", name);
        }
    }
}
