//! Carrier accounts and destination routing rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountSid, RuleId};

/// An upstream carrier account the relay can dispatch through.
///
/// The upstream auth token is stored encrypted (AES-256-GCM under the
/// process master key); decryption happens only at the point of dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierAccount {
    /// The carrier-assigned account SID (primary key).
    pub sid: AccountSid,

    /// Base64-encoded encrypted auth token.
    pub encrypted_token: String,

    /// Friendly name for identification.
    pub name: String,

    /// Default sender number used when a request carries no `From`.
    pub phone_number: Option<String>,

    /// Free-form description.
    pub description: String,

    /// Whether the account can send SMS.
    pub capability_sms: bool,

    /// Whether the account can place voice calls.
    pub capability_voice: bool,

    /// Whether the account can send WhatsApp messages.
    pub capability_whatsapp: bool,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A priority-ordered pattern-to-account mapping.
///
/// Rules are evaluated ascending by `priority` (lower first); the first
/// rule whose pattern matches the destination number, anchored at the
/// start, wins. No match is a valid terminal outcome (routing failure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRule {
    /// The rule ID.
    pub id: RuleId,

    /// Evaluation order; lower means higher priority.
    pub priority: i32,

    /// Regular expression matched against the destination number. The
    /// match is anchored at the start; callers compose `^\+1.*` style
    /// patterns for prefix routing or `^\+15551234567$` for exact
    /// routing.
    pub pattern: String,

    /// The carrier account this rule routes to.
    pub account_sid: AccountSid,

    /// Free-form description.
    pub description: String,
}

impl RoutingRule {
    /// Create a rule.
    #[must_use]
    pub fn new(priority: i32, pattern: impl Into<String>, account_sid: AccountSid) -> Self {
        Self {
            id: RuleId::generate(),
            priority,
            pattern: pattern.into(),
            account_sid,
            description: String::new(),
        }
    }
}
