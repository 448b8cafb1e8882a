//! Error taxonomy for relay operations.

use crate::ids::IdError;
use crate::ChannelKind;

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can terminate a relay request.
///
/// Every pipeline failure maps to exactly one of these variants; the
/// service layer translates them to HTTP status codes and stable
/// machine-readable error codes.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Missing, invalid, or revoked credential.
    #[error("invalid or revoked credential")]
    AuthenticationFailure,

    /// The credential's capability flag for this channel is disabled.
    #[error("{kind} capability disabled for this credential")]
    CapabilityDenied {
        /// The channel that was denied.
        kind: ChannelKind,
    },

    /// The tenant balance does not cover the estimated cost. No debit
    /// occurred.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in units.
        balance: i64,
        /// Required amount in units.
        required: i64,
    },

    /// No routing rule matched the destination and no forced override
    /// was set. The debit has been reversed by a compensating credit.
    #[error("no route found for {to}")]
    NoRouteFound {
        /// The destination number.
        to: String,
    },

    /// The carrier gateway rejected the dispatch or timed out. The debit
    /// has been reversed by a compensating credit.
    #[error("dispatch failed: {0}")]
    DispatchFailure(String),

    /// Missing or invalid master key, or a carrier credential that does
    /// not decrypt. Surfaced distinctly so operators can tell "our bug"
    /// from "tenant's problem".
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
