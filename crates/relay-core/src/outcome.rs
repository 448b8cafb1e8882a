//! Outcome records: the append-only log of every relay attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountSid, ChannelKind, CredentialId, OutcomeId, TenantId};

/// Statuses that reconciliation still considers in flight.
///
/// These match the carrier's own status vocabulary for messages
/// (queued/sending/sent) and calls (initiated/ringing), plus the relay's
/// own `pending`.
pub const NON_TERMINAL_STATUSES: &[&str] =
    &["pending", "queued", "sending", "sent", "initiated", "ringing"];

/// Terminal status set when the carrier no longer knows the resource.
pub const STATUS_NOT_FOUND: &str = "not-found";

/// Terminal status for attempts that never reached the carrier or were
/// rejected by it.
pub const STATUS_FAILED: &str = "failed";

/// Whether a status string is terminal (no further reconciliation).
#[must_use]
pub fn is_terminal_status(status: &str) -> bool {
    !NON_TERMINAL_STATUSES.contains(&status)
}

/// The persisted result of one relay attempt.
///
/// Created once per attempt; afterwards mutated only by status
/// reconciliation or by an inbound delivery-status callback, matched on
/// `carrier_sid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// The record ID (ULID, time-ordered).
    pub id: OutcomeId,

    /// The billed tenant.
    pub tenant_id: TenantId,

    /// The credential that made the request.
    pub credential_id: CredentialId,

    /// The carrier account dispatched through. Unset when routing failed
    /// before dispatch, or when the account was later deleted.
    pub account_sid: Option<AccountSid>,

    /// Channel kind.
    pub kind: ChannelKind,

    /// Destination number as presented.
    pub to_number: String,

    /// Sender number actually used, if any.
    pub from_number: Option<String>,

    /// Message body (empty for calls).
    pub body: Option<String>,

    /// Carrier-assigned identifier. Unset until dispatch succeeds.
    pub carrier_sid: Option<String>,

    /// Current status string (carrier vocabulary).
    pub status: String,

    /// Cost charged for the attempt, in balance units. Zero after a
    /// compensating credit has reversed the charge.
    pub charged_units: i64,

    /// Error text for failed attempts.
    pub error_message: Option<String>,

    /// When the attempt was made.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl OutcomeRecord {
    /// Create a record for an attempt that is about to be dispatched.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        credential_id: CredentialId,
        kind: ChannelKind,
        to_number: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OutcomeId::generate(),
            tenant_id,
            credential_id,
            account_sid: None,
            kind,
            to_number: to_number.into(),
            from_number: None,
            body: None,
            carrier_sid: None,
            status: "pending".to_string(),
            charged_units: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the record dispatched: carrier sid and status assigned.
    pub fn mark_dispatched(&mut self, carrier_sid: impl Into<String>, status: impl Into<String>) {
        self.carrier_sid = Some(carrier_sid.into());
        self.status = status.into();
        self.error_message = None;
        self.updated_at = Utc::now();
    }

    /// Mark the record failed with an error message.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = STATUS_FAILED.to_string();
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Whether reconciliation should still poll this record.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        is_terminal_status(&self.status) || self.carrier_sid.is_none()
    }
}
