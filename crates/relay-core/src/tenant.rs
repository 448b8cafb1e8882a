//! Tenant accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TenantId;

/// A billable customer of the relay.
///
/// The balance is fixed-point with 4 decimal places (see [`crate::units`])
/// and is only ever mutated through the store's debit/credit operations,
/// which hold the per-tenant critical section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// The tenant ID.
    pub id: TenantId,

    /// Display name.
    pub name: String,

    /// Prepaid balance in units (10,000 units = 1.0).
    pub balance_units: i64,

    /// Whether the tenant is active.
    pub is_active: bool,

    /// When the tenant was created.
    pub created_at: DateTime<Utc>,

    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Create a new active tenant with zero balance.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TenantId::generate(),
            name: name.into(),
            balance_units: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the balance covers a debit of `amount_units`.
    #[must_use]
    pub fn has_sufficient_balance(&self, amount_units: i64) -> bool {
        self.balance_units >= amount_units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tenant_starts_empty_and_active() {
        let tenant = Tenant::new("acme");
        assert_eq!(tenant.balance_units, 0);
        assert!(tenant.is_active);
        assert!(tenant.has_sufficient_balance(0));
        assert!(!tenant.has_sufficient_balance(1));
    }
}
