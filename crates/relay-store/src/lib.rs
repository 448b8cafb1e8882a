//! `RocksDB` storage layer for the communications relay.
//!
//! This crate provides persistent storage for tenants, credentials,
//! carrier accounts, routing rules, outcome records, and audit entries
//! using `RocksDB` with column families.
//!
//! # Ledger semantics
//!
//! The tenant balance is the only shared-mutation point in the system.
//! [`Store::debit`] and [`Store::credit`] run inside a per-tenant
//! critical section spanning the read-compare-write, so two concurrent
//! debits against the same tenant can never both succeed when only one
//! amount's worth of balance remains. Operations on different tenants do
//! not contend.
//!
//! # Example
//!
//! ```no_run
//! use relay_store::{RocksStore, Store};
//! use relay_core::Tenant;
//!
//! let store = RocksStore::open("/tmp/relay-db").unwrap();
//!
//! let tenant = Tenant::new("acme");
//! store.put_tenant(&tenant).unwrap();
//! let balance = store.credit(&tenant.id, 50_000).unwrap();
//! assert_eq!(balance, 50_000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use relay_core::{
    AccountSid, AuditEntry, CarrierAccount, ChannelKind, Credential, CredentialId, OutcomeId,
    OutcomeRecord, RoutingRule, RuleId, Tenant, TenantId,
};

/// Filters for querying the outcome log.
///
/// All filters are conjunctive; `search` is a case-insensitive substring
/// match over the carrier SID, destination number, and body.
#[derive(Debug, Clone, Default)]
pub struct OutcomeFilter {
    /// Restrict to one channel kind.
    pub kind: Option<ChannelKind>,
    /// Restrict to one tenant.
    pub tenant_id: Option<TenantId>,
    /// Restrict to one status string.
    pub status: Option<String>,
    /// Free-text substring search.
    pub search: Option<String>,
    /// Maximum number of records to return (newest first).
    pub limit: usize,
}

/// The storage trait defining all database operations.
///
/// This abstracts the storage layer so the service and its tests can run
/// against any implementation.
pub trait Store: Send + Sync {
    // =========================================================================
    // Tenants & Ledger
    // =========================================================================

    /// Insert or update a tenant record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_tenant(&self, tenant: &Tenant) -> Result<()>;

    /// Get a tenant by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_tenant(&self, tenant_id: &TenantId) -> Result<Option<Tenant>>;

    /// Atomically debit a tenant balance.
    ///
    /// Runs read-compare-write under the tenant's critical section and
    /// returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the tenant does not exist.
    /// - [`StoreError::InsufficientFunds`] if the balance does not cover
    ///   `amount_units`; the balance is left unchanged.
    fn debit(&self, tenant_id: &TenantId, amount_units: i64) -> Result<i64>;

    /// Atomically credit a tenant balance and return the new balance.
    ///
    /// Used for funding and for compensating refunds; never performs a
    /// balance check.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the tenant does not exist.
    fn credit(&self, tenant_id: &TenantId, amount_units: i64) -> Result<i64>;

    // =========================================================================
    // Credentials
    // =========================================================================

    /// Insert a credential and its digest index entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_credential(&self, credential: &Credential) -> Result<()>;

    /// Get a credential by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_credential(&self, credential_id: &CredentialId) -> Result<Option<Credential>>;

    /// Resolve an active credential by its key digest.
    ///
    /// Returns `None` for unknown digests and for revoked credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn resolve_credential(&self, digest: &str) -> Result<Option<Credential>>;

    /// Revoke a credential (soft delete; the record survives for log
    /// references).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the credential does not exist.
    fn revoke_credential(&self, credential_id: &CredentialId) -> Result<()>;

    /// List a tenant's credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_credentials(&self, tenant_id: &TenantId) -> Result<Vec<Credential>>;

    // =========================================================================
    // Carrier Accounts & Routing Rules
    // =========================================================================

    /// Insert or update a carrier account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &CarrierAccount) -> Result<()>;

    /// Get a carrier account by SID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, sid: &AccountSid) -> Result<Option<CarrierAccount>>;

    /// Delete a carrier account and cascade-delete its routing rules.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the account does not exist.
    fn delete_account(&self, sid: &AccountSid) -> Result<()>;

    /// List all carrier accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_accounts(&self) -> Result<Vec<CarrierAccount>>;

    /// Insert or update a routing rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_rule(&self, rule: &RoutingRule) -> Result<()>;

    /// Delete a routing rule.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the rule does not exist.
    fn delete_rule(&self, rule_id: &RuleId) -> Result<()>;

    /// List routing rules ascending by priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_rules(&self) -> Result<Vec<RoutingRule>>;

    // =========================================================================
    // Outcome Log
    // =========================================================================

    /// Insert or update an outcome record, maintaining the carrier-SID
    /// index when a SID is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_outcome(&self, record: &OutcomeRecord) -> Result<()>;

    /// Get an outcome record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_outcome(&self, outcome_id: OutcomeId) -> Result<Option<OutcomeRecord>>;

    /// Find an outcome record by its carrier-assigned SID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_outcome_by_carrier_sid(&self, carrier_sid: &str) -> Result<Option<OutcomeRecord>>;

    /// List records with a non-terminal status and a carrier SID, created
    /// within the last `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_unsettled_outcomes(&self, window: chrono::Duration) -> Result<Vec<OutcomeRecord>>;

    /// Query the outcome log, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn query_outcomes(&self, filter: &OutcomeFilter) -> Result<Vec<OutcomeRecord>>;

    // =========================================================================
    // Audit Log
    // =========================================================================

    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn append_audit(&self, entry: &AuditEntry) -> Result<()>;

    /// List audit entries, newest first, optionally filtered by a
    /// substring over action and details.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_audit(&self, search: Option<&str>, limit: usize) -> Result<Vec<AuditEntry>>;
}
