//! # Customer Upsert
//!
//! Decides how a paid invoice changes the customer records.
//!
//! ## Matching Order
//! ```text
//! paid invoice (name, phone, email?)
//!      │
//!      ├── customer with same phone?  ──► Update that record
//!      │
//!      ├── email given and customer
//!      │   with same email?           ──► Update that record (phone kept)
//!      │
//!      └── otherwise                  ──► Create a new record
//!
//! Update/Create both:  total_spent += grand_total
//!                      last_purchase_at = paid_at
//!                      status = Active
//! ```
//!
//! The store looks the candidates up and persists the result; this module
//! only plans the change.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::money::Money;
use crate::types::{Customer, CustomerInfo, CustomerStatus};

/// Planned customer change for a settled invoice.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerUpsert {
    /// Existing record with refreshed fields.
    Update(Customer),
    /// Brand-new record.
    Create(Customer),
}

impl CustomerUpsert {
    /// The customer record as it will be stored.
    pub fn customer(&self) -> &Customer {
        match self {
            CustomerUpsert::Update(c) | CustomerUpsert::Create(c) => c,
        }
    }

    pub fn into_customer(self) -> Customer {
        match self {
            CustomerUpsert::Update(c) | CustomerUpsert::Create(c) => c,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, CustomerUpsert::Create(_))
    }
}

/// Plans the customer create/update for a payment of `amount`.
///
/// ## Arguments
/// * `by_phone` - Existing customer with the invoice's phone, if any
/// * `by_email` - Existing customer with the invoice's email, if any
/// * `info` - Customer details captured on the invoice
/// * `amount` - Grand total of the paid invoice
/// * `at` - Payment time
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use scanpos_core::{plan_customer_upsert, CustomerInfo, Money};
///
/// let info = CustomerInfo { name: "Asha".into(), phone: "9876543210".into(), email: None };
/// let plan = plan_customer_upsert(None, None, &info, Money::from_cents(247_800), Utc::now());
/// assert!(plan.is_create());
/// assert_eq!(plan.customer().total_spent_cents, 247_800);
/// ```
pub fn plan_customer_upsert(
    by_phone: Option<&Customer>,
    by_email: Option<&Customer>,
    info: &CustomerInfo,
    amount: Money,
    at: DateTime<Utc>,
) -> CustomerUpsert {
    let by_email = by_email.filter(|_| info.email.is_some());

    match by_phone.or(by_email) {
        Some(existing) => {
            let mut customer = existing.clone();
            customer.name = info.name.clone();
            if info.email.is_some() {
                customer.email = info.email.clone();
            }
            customer.total_spent_cents += amount.cents();
            customer.last_purchase_at = Some(at);
            customer.status = CustomerStatus::Active;
            customer.updated_at = at;
            CustomerUpsert::Update(customer)
        }
        None => {
            let mut customer = new_customer(info, at);
            customer.total_spent_cents = amount.cents();
            customer.last_purchase_at = Some(at);
            CustomerUpsert::Create(customer)
        }
    }
}

/// A fresh active customer with no spend, used for manual creation.
pub fn new_customer(info: &CustomerInfo, at: DateTime<Utc>) -> Customer {
    Customer {
        id: Uuid::new_v4().to_string(),
        name: info.name.clone(),
        phone: info.phone.clone(),
        email: info.email.clone(),
        total_spent_cents: 0,
        last_purchase_at: None,
        status: CustomerStatus::Active,
        created_at: at,
        updated_at: at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn existing(id: &str, phone: &str, email: Option<&str>, spent: i64) -> Customer {
        Customer {
            id: id.to_string(),
            name: "Old Name".to_string(),
            phone: phone.to_string(),
            email: email.map(str::to_string),
            total_spent_cents: spent,
            last_purchase_at: None,
            status: CustomerStatus::Inactive,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    fn info(email: Option<&str>) -> CustomerInfo {
        CustomerInfo {
            name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_phone_match_wins_over_email_match() {
        let phone = existing("c-phone", "9876543210", None, 1_000);
        let email = existing("c-email", "1111111111", Some("asha@example.com"), 5_000);

        let plan = plan_customer_upsert(
            Some(&phone),
            Some(&email),
            &info(Some("asha@example.com")),
            Money::from_cents(247_800),
            at(100),
        );

        let CustomerUpsert::Update(c) = plan else {
            panic!("expected update");
        };
        assert_eq!(c.id, "c-phone");
        assert_eq!(c.total_spent_cents, 248_800);
        assert_eq!(c.name, "Asha Rao");
        assert_eq!(c.email.as_deref(), Some("asha@example.com"));
        assert_eq!(c.status, CustomerStatus::Active);
        assert_eq!(c.last_purchase_at, Some(at(100)));
    }

    #[test]
    fn test_email_match_when_phone_unknown() {
        let email = existing("c-email", "1111111111", Some("asha@example.com"), 5_000);

        let plan = plan_customer_upsert(
            None,
            Some(&email),
            &info(Some("asha@example.com")),
            Money::from_cents(100),
            at(100),
        );

        let c = plan.customer();
        assert!(!plan.is_create());
        assert_eq!(c.id, "c-email");
        assert_eq!(c.phone, "1111111111");
        assert_eq!(c.total_spent_cents, 5_100);
    }

    #[test]
    fn test_email_candidate_ignored_without_invoice_email() {
        let email = existing("c-email", "1111111111", Some("asha@example.com"), 5_000);

        let plan = plan_customer_upsert(None, Some(&email), &info(None), Money::from_cents(100), at(1));
        assert!(plan.is_create());
    }

    #[test]
    fn test_missing_email_keeps_stored_email() {
        let phone = existing("c-phone", "9876543210", Some("old@example.com"), 0);

        let plan = plan_customer_upsert(Some(&phone), None, &info(None), Money::from_cents(1), at(1));
        assert_eq!(plan.customer().email.as_deref(), Some("old@example.com"));
    }

    #[test]
    fn test_create_when_no_match() {
        let plan = plan_customer_upsert(None, None, &info(None), Money::from_cents(247_800), at(5));

        let c = plan.into_customer();
        assert_eq!(c.phone, "9876543210");
        assert_eq!(c.total_spent_cents, 247_800);
        assert_eq!(c.status, CustomerStatus::Active);
        assert_eq!(c.created_at, at(5));
    }

    #[test]
    fn test_new_customer_has_no_spend() {
        let c = new_customer(&info(None), at(9));
        assert_eq!(c.total_spent(), Money::zero());
        assert!(c.last_purchase_at.is_none());
    }
}
