//! Key encoding utilities for `RocksDB`.

use relay_core::{AccountSid, AuditId, CredentialId, OutcomeId, RuleId, TenantId};

/// Create a tenant key from a tenant ID.
#[must_use]
pub fn tenant_key(tenant_id: &TenantId) -> Vec<u8> {
    tenant_id.as_bytes().to_vec()
}

/// Create a credential key from a credential ID.
#[must_use]
pub fn credential_key(credential_id: &CredentialId) -> Vec<u8> {
    credential_id.as_bytes().to_vec()
}

/// Create a digest-index key from a hex key digest.
#[must_use]
pub fn digest_key(digest: &str) -> Vec<u8> {
    digest.as_bytes().to_vec()
}

/// Create a carrier account key from its SID.
#[must_use]
pub fn account_key(sid: &AccountSid) -> Vec<u8> {
    sid.as_ref().to_vec()
}

/// Create a routing rule key from a rule ID.
#[must_use]
pub fn rule_key(rule_id: &RuleId) -> Vec<u8> {
    rule_id.as_bytes().to_vec()
}

/// Create an outcome key from an outcome ID.
///
/// ULIDs are time-ordered, so iterating this column family walks the
/// outcome log chronologically.
#[must_use]
pub fn outcome_key(outcome_id: OutcomeId) -> Vec<u8> {
    outcome_id.to_bytes().to_vec()
}

/// Create a carrier-SID index key.
#[must_use]
pub fn outcome_sid_key(carrier_sid: &str) -> Vec<u8> {
    carrier_sid.as_bytes().to_vec()
}

/// Create an audit entry key from an audit ID.
#[must_use]
pub fn audit_key(audit_id: AuditId) -> Vec<u8> {
    audit_id.to_bytes().to_vec()
}
