//! Relay endpoint handlers.
//!
//! The request body uses the carrier's own field names (`To`, `Body`,
//! `From`) so callers can switch their carrier SDK base URL to the relay
//! without rewriting payloads.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use relay_core::{format_units, ChannelKind};

use crate::auth::RelayAuth;
use crate::error::ApiError;
use crate::pipeline::{self, SendRequest};
use crate::state::AppState;

/// A relay request in carrier field naming.
#[derive(Debug, Deserialize, Default)]
pub struct RelayRequest {
    /// Destination number.
    #[serde(rename = "To")]
    pub to: String,

    /// Sender number; defaults to the routed account's number.
    #[serde(rename = "From")]
    pub from: Option<String>,

    /// Message body (messages only).
    #[serde(rename = "Body")]
    pub body: Option<String>,

    /// Media URLs to attach (messages only).
    #[serde(rename = "MediaUrl", default)]
    pub media_urls: Vec<String>,

    /// Inline TwiML (calls only).
    #[serde(rename = "Twiml")]
    pub twiml: Option<String>,

    /// URL returning TwiML (calls only).
    #[serde(rename = "Url")]
    pub url: Option<String>,
}

/// What an accepted relay returns.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    /// Initial carrier status (e.g. `queued`, `initiated`).
    pub status: String,

    /// Carrier-assigned SID.
    pub sid: String,

    /// Cost charged, as a 4-decimal string.
    pub cost: String,

    /// Balance after the charge, as a 4-decimal string.
    pub balance: String,
}

/// `POST /relay/api/sms`
pub async fn relay_sms(
    State(state): State<Arc<AppState>>,
    auth: RelayAuth,
    Json(request): Json<RelayRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    relay_message(state, auth, ChannelKind::Sms, request).await
}

/// `POST /relay/api/whatsapp`
pub async fn relay_whatsapp(
    State(state): State<Arc<AppState>>,
    auth: RelayAuth,
    Json(request): Json<RelayRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    relay_message(state, auth, ChannelKind::Whatsapp, request).await
}

/// `POST /relay/api/call`
pub async fn relay_call(
    State(state): State<Arc<AppState>>,
    auth: RelayAuth,
    Json(request): Json<RelayRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    validate_to(&request.to)?;
    if request.twiml.is_none() && request.url.is_none() {
        return Err(ApiError::BadRequest(
            "call requires either Twiml or Url".into(),
        ));
    }

    let receipt = pipeline::dispatch(
        &state,
        &auth.identity,
        ChannelKind::Call,
        SendRequest {
            to: request.to,
            from: request.from,
            twiml: request.twiml,
            url: request.url,
            ..SendRequest::default()
        },
    )
    .await?;

    Ok(Json(receipt_response(&receipt)))
}

async fn relay_message(
    state: Arc<AppState>,
    auth: RelayAuth,
    kind: ChannelKind,
    request: RelayRequest,
) -> Result<Json<RelayResponse>, ApiError> {
    validate_to(&request.to)?;
    if request.body.as_deref().unwrap_or("").is_empty() {
        return Err(ApiError::BadRequest("message requires a Body".into()));
    }

    let receipt = pipeline::dispatch(
        &state,
        &auth.identity,
        kind,
        SendRequest {
            to: request.to,
            from: request.from,
            body: request.body,
            media_urls: request.media_urls,
            ..SendRequest::default()
        },
    )
    .await?;

    Ok(Json(receipt_response(&receipt)))
}

fn validate_to(to: &str) -> Result<(), ApiError> {
    if to.trim().is_empty() {
        return Err(ApiError::BadRequest("To is required".into()));
    }
    Ok(())
}

fn receipt_response(receipt: &pipeline::RelayReceipt) -> RelayResponse {
    RelayResponse {
        status: receipt.status.clone(),
        sid: receipt.sid.clone(),
        cost: format_units(receipt.cost_units),
        balance: format_units(receipt.balance_units),
    }
}
