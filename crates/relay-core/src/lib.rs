//! Core types and utilities for the communications relay.
//!
//! This crate provides the foundational types used throughout the relay:
//!
//! - **Identifiers**: `TenantId`, `CredentialId`, `RuleId`, `OutcomeId`, `AuditId`, `AccountSid`
//! - **Tenants**: `Tenant` with a prepaid balance
//! - **Credentials**: `Credential`, `Identity`, key generation and digests
//! - **Routing**: `CarrierAccount`, `RoutingRule`
//! - **Outcomes**: `OutcomeRecord`, terminal/non-terminal status sets
//! - **Channels**: `ChannelKind` with flat per-kind rates and addressing rules
//! - **Audit**: `AuditEntry`
//!
//! # Balance Units
//!
//! **10,000 units = 1.0 in the tenant's currency** (fixed point, 4 decimal
//! places).
//!
//! - An SMS costs 0.0075 → 75 units are debited
//! - Stored as `i64` to avoid floating point precision issues

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod audit;
pub mod channel;
pub mod credential;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod routing;
pub mod tenant;
pub mod units;

pub use audit::{actions, AuditEntry};
pub use channel::{strip_whatsapp_scheme, with_whatsapp_scheme, ChannelKind, WHATSAPP_SCHEME};
pub use credential::{key_digest, Credential, Identity, KEY_PREFIX_LEN, KEY_SECRET_BYTES};
pub use error::{RelayError, Result};
pub use ids::{AccountSid, AuditId, CredentialId, IdError, OutcomeId, RuleId, TenantId};
pub use outcome::{
    is_terminal_status, OutcomeRecord, NON_TERMINAL_STATUSES, STATUS_FAILED, STATUS_NOT_FOUND,
};
pub use routing::{CarrierAccount, RoutingRule};
pub use tenant::Tenant;
pub use units::{format_units, parse_units, UnitsError, UNIT_SCALE};
