//! Shared application state.

use std::sync::Arc;

use scanpos_db::Store;
use scanpos_gateway::{NotificationDispatcher, PaymentGateway};

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::services::{
    AuthService, CustomerService, DashboardService, InventoryService, InvoiceService,
};

/// Handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub invoices: Arc<InvoiceService>,
    pub inventory: Arc<InventoryService>,
    pub customers: Arc<CustomerService>,
    pub dashboard: Arc<DashboardService>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires the services around one store, gateway and dispatcher.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        let jwt_manager = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);

        AppState {
            invoices: Arc::new(InvoiceService::new(
                store.clone(),
                gateway,
                dispatcher,
                config.invoice_number_attempts,
                config.gateway_timeout(),
            )),
            inventory: Arc::new(InventoryService::new(store.clone())),
            customers: Arc::new(CustomerService::new(store.clone())),
            dashboard: Arc::new(DashboardService::new(store.clone())),
            auth: Arc::new(AuthService::new(store, jwt_manager)),
            config: Arc::new(config),
        }
    }
}
