//! Service layer.
//!
//! Each service owns the business flow for one route group and talks to
//! storage only through `Arc<dyn Store>`.

pub mod auth_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod invoice_service;

pub use auth_service::AuthService;
pub use customer_service::CustomerService;
pub use dashboard_service::DashboardService;
pub use inventory_service::InventoryService;
pub use invoice_service::InvoiceService;
