//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Tenant records, keyed by `tenant_id`.
    pub const TENANTS: &str = "tenants";

    /// Credential records, keyed by `credential_id`.
    pub const CREDENTIALS: &str = "credentials";

    /// Index: credential id by key digest. Value is the credential id
    /// bytes. Lookups during authentication go through this index.
    pub const CREDENTIALS_BY_DIGEST: &str = "credentials_by_digest";

    /// Carrier account records, keyed by account SID.
    pub const ACCOUNTS: &str = "accounts";

    /// Routing rules, keyed by `rule_id`.
    pub const RULES: &str = "rules";

    /// Outcome records, keyed by `outcome_id` (ULID, so iteration is
    /// chronological).
    pub const OUTCOMES: &str = "outcomes";

    /// Index: outcome id by carrier-assigned SID. Used by the
    /// delivery-status callback and reconciliation.
    pub const OUTCOMES_BY_SID: &str = "outcomes_by_sid";

    /// Audit entries, keyed by `audit_id` (ULID).
    pub const AUDIT: &str = "audit";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::TENANTS,
        cf::CREDENTIALS,
        cf::CREDENTIALS_BY_DIGEST,
        cf::ACCOUNTS,
        cf::RULES,
        cf::OUTCOMES,
        cf::OUTCOMES_BY_SID,
        cf::AUDIT,
    ]
}
