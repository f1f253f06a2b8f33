//! Dashboard counters.

use std::sync::Arc;

use scanpos_core::DashboardStats;
use scanpos_db::Store;

use crate::error::ApiResult;

pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        DashboardService { store }
    }

    pub async fn stats(&self) -> ApiResult<DashboardStats> {
        Ok(self.store.dashboard_stats().await?)
    }

    /// Liveness of the backing store.
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await
    }
}
