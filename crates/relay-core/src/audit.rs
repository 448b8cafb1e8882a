//! Audit log entries for operator-visible actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuditId;

/// Well-known audit action names.
pub mod actions {
    /// A credential was generated.
    pub const KEY_GENERATED: &str = "key_generated";
    /// A credential was revoked.
    pub const KEY_REVOKED: &str = "key_revoked";
    /// A tenant balance was adjusted manually.
    pub const BALANCE_ADJUSTED: &str = "balance_adjusted";
    /// A compensating credit reversed a debit after a failed dispatch.
    ///
    /// Logged distinctly from the original debit so both legs stay
    /// visible in the ledger history.
    pub const REFUND_ISSUED: &str = "refund_issued";
    /// A carrier account was created or updated.
    pub const ACCOUNT_SAVED: &str = "account_saved";
    /// A carrier account was deleted (rules cascade).
    pub const ACCOUNT_DELETED: &str = "account_deleted";
    /// A routing rule was created.
    pub const RULE_CREATED: &str = "rule_created";
    /// A routing rule was deleted.
    pub const RULE_DELETED: &str = "rule_deleted";
}

/// One append-only audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The entry ID (ULID, time-ordered).
    pub id: AuditId,

    /// Who performed the action (admin id, or `relay` for pipeline
    /// events such as refunds).
    pub actor: String,

    /// Action name; see [`actions`].
    pub action: String,

    /// Human-readable details.
    pub details: String,

    /// When the action happened.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Create an entry timestamped now.
    #[must_use]
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditId::generate(),
            actor: actor.into(),
            action: action.into(),
            details: details.into(),
            created_at: Utc::now(),
        }
    }
}
