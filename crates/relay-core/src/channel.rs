//! Communication channel kinds and their per-kind behavior.
//!
//! The three channels share the whole relay pipeline; they differ only in
//! flat rate, addressing rules, and which carrier call dispatches them.
//! That variation lives here as a tagged enum rather than anywhere deeper
//! in the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheme prefix the carrier expects on WhatsApp addresses.
pub const WHATSAPP_SCHEME: &str = "whatsapp:";

/// The kind of communication being relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Plain SMS message.
    Sms,
    /// WhatsApp message (carrier addresses carry a `whatsapp:` scheme).
    Whatsapp,
    /// Outbound voice call.
    Call,
}

impl ChannelKind {
    /// Flat cost estimate per dispatch, in balance units.
    ///
    /// These are estimates, not measured usage; reconciliation later
    /// overwrites the record with the carrier's measured price when one
    /// is reported.
    #[must_use]
    pub const fn rate_units(self) -> i64 {
        match self {
            Self::Sms => 75,      // 0.0075
            Self::Whatsapp => 50, // 0.0050
            Self::Call => 150,    // 0.0150
        }
    }

    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Whatsapp => "whatsapp",
            Self::Call => "call",
        }
    }

    /// Whether this kind dispatches through the carrier's message API
    /// (as opposed to the calls API).
    #[must_use]
    pub const fn is_message(self) -> bool {
        matches!(self, Self::Sms | Self::Whatsapp)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Add the `whatsapp:` scheme to a number if it is not already present.
#[must_use]
pub fn with_whatsapp_scheme(number: &str) -> String {
    if number.starts_with(WHATSAPP_SCHEME) {
        number.to_string()
    } else {
        format!("{WHATSAPP_SCHEME}{number}")
    }
}

/// Strip the `whatsapp:` scheme from a number if present.
///
/// Routing rules match on the raw destination number, so WhatsApp
/// destinations are stripped before rule evaluation.
#[must_use]
pub fn strip_whatsapp_scheme(number: &str) -> &str {
    number.strip_prefix(WHATSAPP_SCHEME).unwrap_or(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_match_the_rate_card() {
        assert_eq!(ChannelKind::Sms.rate_units(), 75);
        assert_eq!(ChannelKind::Whatsapp.rate_units(), 50);
        assert_eq!(ChannelKind::Call.rate_units(), 150);
    }

    #[test]
    fn whatsapp_scheme_is_idempotent() {
        assert_eq!(with_whatsapp_scheme("+155"), "whatsapp:+155");
        assert_eq!(with_whatsapp_scheme("whatsapp:+155"), "whatsapp:+155");
        assert_eq!(strip_whatsapp_scheme("whatsapp:+155"), "+155");
        assert_eq!(strip_whatsapp_scheme("+155"), "+155");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&ChannelKind::Whatsapp).unwrap(),
            "\"whatsapp\""
        );
        let kind: ChannelKind = serde_json::from_str("\"call\"").unwrap();
        assert_eq!(kind, ChannelKind::Call);
    }
}
