//! Carrier delivery-status callbacks.
//!
//! The carrier posts status updates as form-encoded bodies (JSON when
//! configured that way). The callback is unauthenticated; the only gate
//! is that the carrier SID must match a known outcome record, and
//! unknown SIDs are acknowledged without effect so the carrier stops
//! retrying.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use relay_store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// Fields the carrier may put the resource SID in, in precedence order.
const SID_FIELDS: &[&str] = &["MessageSid", "SmsSid", "CallSid", "Sid"];

/// Fields the carrier may put the status in, in precedence order.
const STATUS_FIELDS: &[&str] = &["MessageStatus", "CallStatus", "Status"];

/// Callback acknowledgement.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    /// `updated` when a record changed, `ignored` otherwise.
    pub result: String,
}

/// `POST /relay/twilio/webhook`
pub async fn carrier_callback(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<CallbackResponse>, ApiError> {
    let fields = parse_callback_body(&body)
        .ok_or_else(|| ApiError::BadRequest("unparseable callback body".into()))?;

    let Some(carrier_sid) = first_field(&fields, SID_FIELDS) else {
        return Err(ApiError::BadRequest("callback carries no resource sid".into()));
    };
    let Some(status) = first_field(&fields, STATUS_FIELDS) else {
        return Err(ApiError::BadRequest("callback carries no status".into()));
    };

    let Some(mut record) = state.store.find_outcome_by_carrier_sid(carrier_sid)? else {
        tracing::debug!(%carrier_sid, "callback for unknown sid, ignoring");
        return Ok(Json(CallbackResponse {
            result: "ignored".into(),
        }));
    };

    record.status = status.to_string();
    if let Some(error) = first_field(&fields, &["ErrorMessage"]) {
        record.error_message = Some(error.to_string());
    }
    record.updated_at = chrono::Utc::now();
    state.store.put_outcome(&record)?;

    tracing::info!(%carrier_sid, %status, "callback applied");

    Ok(Json(CallbackResponse {
        result: "updated".into(),
    }))
}

/// Parse a callback body as form encoding, or JSON when it looks like an
/// object.
fn parse_callback_body(body: &str) -> Option<HashMap<String, String>> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        let value: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(trimmed).ok()?;
        Some(
            value
                .into_iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k, s)),
                    serde_json::Value::Number(n) => Some((k, n.to_string())),
                    _ => None,
                })
                .collect(),
        )
    } else {
        serde_urlencoded::from_str(body).ok()
    }
}

fn first_field<'a>(fields: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}
