//! Customer service.
//!
//! Manual customer records. Spend and last purchase are only ever moved by
//! invoice settlement, never through these operations.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use scanpos_core::validation::validate_customer_info;
use scanpos_core::{new_customer, Customer, CustomerStatus};
use scanpos_db::Store;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub email: Option<String>,
    pub status: Option<CustomerStatus>,
}

pub struct CustomerService {
    store: Arc<dyn Store>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CustomerService { store }
    }

    /// Recent buyers first.
    pub async fn list(&self) -> ApiResult<Vec<Customer>> {
        Ok(self.store.list_customers().await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Customer> {
        self.store
            .get_customer(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer", id))
    }

    pub async fn create(&self, input: CustomerInput) -> ApiResult<Customer> {
        let info = validate_customer_info(&input.name, &input.phone, input.email.as_deref())?;

        let mut customer = new_customer(&info, Utc::now());
        if let Some(status) = input.status {
            customer.status = status;
        }
        self.store.insert_customer(&customer).await?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Edits contact details and status. A missing status keeps the current one.
    pub async fn update(&self, id: &str, input: CustomerInput) -> ApiResult<Customer> {
        let info = validate_customer_info(&input.name, &input.phone, input.email.as_deref())?;
        let mut customer = self.get(id).await?;

        customer.name = info.name;
        customer.phone = info.phone;
        customer.email = info.email;
        if let Some(status) = input.status {
            customer.status = status;
        }
        customer.updated_at = Utc::now();

        self.store.update_customer(&customer).await?;

        info!(customer_id = %customer.id, "Customer updated");
        Ok(customer)
    }
}
