//! API credentials and the identities they resolve to.
//!
//! A credential stores only a SHA-256 digest of its secret: the plaintext
//! is generated once, handed to the caller, and is unrecoverable after
//! that. Revocation is a soft delete (`is_active = false`) so outcome
//! records keep valid credential references.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountSid, ChannelKind, CredentialId, TenantId};

/// Bytes of entropy in a generated secret (256 bits).
pub const KEY_SECRET_BYTES: usize = 32;

/// Length of the non-secret display prefix.
pub const KEY_PREFIX_LEN: usize = 8;

/// Compute the hex-encoded SHA-256 digest of a presented secret.
///
/// Both the store (at rest) and the validation cache (as its key) work on
/// this digest; the plaintext never travels past the HTTP boundary.
#[must_use]
pub fn key_digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// An API credential granting a tenant's caller access to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// The credential ID.
    pub id: CredentialId,

    /// The owning tenant.
    pub tenant_id: TenantId,

    /// Hex-encoded SHA-256 digest of the secret. Never the secret itself.
    pub key_digest: String,

    /// First few characters of the plaintext, for human identification.
    pub prefix: String,

    /// Whether the key may send SMS.
    pub allow_sms: bool,

    /// Whether the key may place voice calls.
    pub allow_voice: bool,

    /// Whether the key may send WhatsApp messages.
    pub allow_whatsapp: bool,

    /// Optional forced carrier account, bypassing all routing rules.
    pub forced_account: Option<AccountSid>,

    /// Whether the key is active. Revocation clears this flag.
    pub is_active: bool,

    /// When the key was created.
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Generate a new credential for a tenant.
    ///
    /// Returns the credential record and the plaintext secret. The
    /// plaintext is returned exactly once and cannot be recovered later.
    #[must_use]
    pub fn generate(tenant_id: TenantId, forced_account: Option<AccountSid>) -> (Self, String) {
        let mut bytes = [0u8; KEY_SECRET_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let secret = URL_SAFE_NO_PAD.encode(bytes);

        let credential = Self {
            id: CredentialId::generate(),
            tenant_id,
            key_digest: key_digest(&secret),
            prefix: secret[..KEY_PREFIX_LEN].to_string(),
            allow_sms: true,
            allow_voice: true,
            allow_whatsapp: true,
            forced_account,
            is_active: true,
            created_at: Utc::now(),
        };

        (credential, secret)
    }

    /// Whether the key allows dispatching on the given channel.
    #[must_use]
    pub const fn allows(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Sms => self.allow_sms,
            ChannelKind::Whatsapp => self.allow_whatsapp,
            ChannelKind::Call => self.allow_voice,
        }
    }

    /// Revoke the key.
    pub fn revoke(&mut self) {
        self.is_active = false;
    }
}

/// The resolved identity of an authenticated caller.
///
/// This is the value cached by the key validation cache and threaded
/// explicitly through the relay pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// The credential the caller presented.
    pub credential_id: CredentialId,

    /// The tenant being billed.
    pub tenant_id: TenantId,

    /// Whether SMS dispatch is allowed.
    pub allow_sms: bool,

    /// Whether voice dispatch is allowed.
    pub allow_voice: bool,

    /// Whether WhatsApp dispatch is allowed.
    pub allow_whatsapp: bool,

    /// Forced carrier account override, if any.
    pub forced_account: Option<AccountSid>,
}

impl Identity {
    /// Whether the identity allows dispatching on the given channel.
    #[must_use]
    pub const fn allows(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Sms => self.allow_sms,
            ChannelKind::Whatsapp => self.allow_whatsapp,
            ChannelKind::Call => self.allow_voice,
        }
    }
}

impl From<&Credential> for Identity {
    fn from(credential: &Credential) -> Self {
        Self {
            credential_id: credential.id,
            tenant_id: credential.tenant_id,
            allow_sms: credential.allow_sms,
            allow_voice: credential.allow_voice,
            allow_whatsapp: credential.allow_whatsapp,
            forced_account: credential.forced_account.clone(),
        }
    }
}
