//! Identifier types for the relay.
//!
//! UUID-based identifiers cover entities created by operators (tenants,
//! credentials, routing rules); ULID-based identifiers cover append-only
//! records (outcomes, audit entries) where time-ordering matters.
//! `AccountSid` is the upstream carrier's own account identifier and is
//! carried verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Macro to define a UUID-based identifier type with standard trait implementations.
macro_rules! uuid_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Create an identifier from a UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Return the bytes of the UUID (16 bytes).
            #[must_use]
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
                Ok(Self(uuid))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }
    };
}

/// Macro to define a ULID-based identifier type (time-ordered).
macro_rules! ulid_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Ulid);

        impl $name {
            /// Generate a new identifier with the current timestamp.
            #[must_use]
            pub fn generate() -> Self {
                Self(Ulid::new())
            }

            /// Return the bytes of the ULID (16 bytes).
            #[must_use]
            pub fn to_bytes(self) -> [u8; 16] {
                self.0.to_bytes()
            }

            /// Create an identifier from raw ULID bytes.
            #[must_use]
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Ulid::from_bytes(bytes))
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
                Ok(Self(ulid))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

uuid_id_type!(TenantId, "A tenant identifier.\n\nTenants are the billable customers of the relay.");
uuid_id_type!(CredentialId, "An API credential identifier.\n\nThe credential itself stores only a digest of the secret.");
uuid_id_type!(RuleId, "A routing rule identifier.");

ulid_id_type!(OutcomeId, "An outcome record identifier (ULID for time-ordering).\n\nTime-ordered IDs let the outcome log be scanned newest-first without a\nsecondary index.");
ulid_id_type!(AuditId, "An audit entry identifier (ULID for time-ordering).");

/// Maximum length of an upstream carrier account SID.
const MAX_SID_LEN: usize = 64;

/// An upstream carrier account SID.
///
/// The SID is assigned by the carrier (Twilio-style, e.g. `AC...`) and is
/// used verbatim as the primary key for [`crate::CarrierAccount`] records.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountSid(String);

impl AccountSid {
    /// Create an account SID, validating basic shape.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidSid`] if the SID is empty, too long, or
    /// contains non-ASCII-alphanumeric characters.
    pub fn new(sid: impl Into<String>) -> Result<Self, IdError> {
        let sid = sid.into();
        if sid.is_empty()
            || sid.len() > MAX_SID_LEN
            || !sid.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(IdError::InvalidSid);
        }
        Ok(Self(sid))
    }

    /// Return the SID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountSid {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for AccountSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountSid({})", self.0)
    }
}

impl fmt::Display for AccountSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountSid {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountSid> for String {
    fn from(sid: AccountSid) -> Self {
        sid.0
    }
}

impl AsRef<[u8]> for AccountSid {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,

    /// The input is not a valid carrier account SID.
    #[error("invalid account SID")]
    InvalidSid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_id_roundtrip() {
        let id = TenantId::generate();
        let parsed: TenantId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn outcome_id_is_time_ordered() {
        let a = OutcomeId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = OutcomeId::generate();
        assert!(a.to_bytes() < b.to_bytes());
    }

    #[test]
    fn account_sid_rejects_bad_input() {
        assert!(AccountSid::new("").is_err());
        assert!(AccountSid::new("has spaces").is_err());
        assert!(AccountSid::new("x".repeat(65)).is_err());
        assert!(AccountSid::new("AC0123456789abcdef").is_ok());
    }

    #[test]
    fn invalid_uuid_is_rejected() {
        assert_eq!("nope".parse::<TenantId>(), Err(IdError::InvalidUuid));
    }
}
