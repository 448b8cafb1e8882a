//! The carrier gateway contract.

use async_trait::async_trait;

use relay_core::ChannelKind;

use crate::Result;

/// Decrypted auth material for one carrier account.
///
/// Built at the point of dispatch from the stored account record and the
/// master-key cipher; never persisted.
#[derive(Debug, Clone)]
pub struct CarrierCredentials {
    /// The carrier account SID.
    pub account_sid: String,
    /// The decrypted auth token.
    pub token: String,
}

/// An outbound SMS or WhatsApp message, fully addressed.
#[derive(Debug, Clone, Default)]
pub struct OutboundMessage {
    /// Destination (scheme-prefixed for WhatsApp).
    pub to: String,
    /// Sender, if resolved.
    pub from: Option<String>,
    /// Message body.
    pub body: String,
    /// Media URLs to attach.
    pub media_urls: Vec<String>,
    /// URL the carrier should push status updates to.
    pub status_callback: Option<String>,
}

/// An outbound voice call.
#[derive(Debug, Clone, Default)]
pub struct OutboundCall {
    /// Destination number.
    pub to: String,
    /// Caller ID, if resolved.
    pub from: Option<String>,
    /// Inline TwiML instructions.
    pub twiml: Option<String>,
    /// URL returning TwiML (alternative to `twiml`).
    pub url: Option<String>,
    /// URL the carrier should push status updates to.
    pub status_callback: Option<String>,
}

/// What the carrier returned for a successful dispatch.
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    /// Carrier-assigned identifier.
    pub sid: String,
    /// Initial status (e.g. `queued`, `initiated`).
    pub status: String,
    /// Measured price in balance units, when already known.
    pub price_units: Option<i64>,
}

/// The current state of a previously dispatched resource.
#[derive(Debug, Clone)]
pub struct ResourceStatus {
    /// Current status string.
    pub status: String,
    /// Carrier error code, if the dispatch failed upstream.
    pub error_code: Option<String>,
    /// Carrier error message, if any.
    pub error_message: Option<String>,
    /// Measured price in balance units, when reported.
    pub price_units: Option<i64>,
}

/// The relay's view of an upstream carrier.
///
/// One implementation speaks the carrier's REST API; tests provide their
/// own. All calls run under the implementation's own bounded timeout; a
/// timeout surfaces as [`crate::CarrierError::Http`] and is handled like
/// any other dispatch failure.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    /// Send an SMS or WhatsApp message.
    async fn send_message(
        &self,
        auth: &CarrierCredentials,
        message: &OutboundMessage,
    ) -> Result<DispatchReceipt>;

    /// Place a voice call.
    async fn place_call(
        &self,
        auth: &CarrierCredentials,
        call: &OutboundCall,
    ) -> Result<DispatchReceipt>;

    /// Fetch the current status of a dispatched resource by carrier SID.
    ///
    /// Returns [`crate::CarrierError::NotFound`] when the carrier no
    /// longer knows the SID.
    async fn fetch_status(
        &self,
        auth: &CarrierCredentials,
        carrier_sid: &str,
        kind: ChannelKind,
    ) -> Result<ResourceStatus>;
}
