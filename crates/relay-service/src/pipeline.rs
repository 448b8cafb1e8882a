//! The relay pipeline: debit, route, dispatch, settle.
//!
//! The estimated cost is debited before routing and dispatch. Every
//! failure past the debit point issues a compensating credit and logs it
//! as a distinct refund, so the ledger shows both legs. The pipeline
//! performs no retries; the caller sees exactly one attempt and one
//! outcome record.

use relay_carrier::{CarrierCredentials, OutboundCall, OutboundMessage};
use relay_core::{
    actions, strip_whatsapp_scheme, with_whatsapp_scheme, AuditEntry, CarrierAccount, ChannelKind,
    Identity, OutcomeRecord,
};
use relay_store::Store;

use crate::error::ApiError;
use crate::router;
use crate::state::AppState;

/// Actor name used for pipeline-initiated audit entries.
const PIPELINE_ACTOR: &str = "relay";

/// One fully validated relay request.
#[derive(Debug, Clone, Default)]
pub struct SendRequest {
    /// Destination number (scheme-prefixed or bare for WhatsApp).
    pub to: String,
    /// Explicit sender; falls back to the account default.
    pub from: Option<String>,
    /// Message body (messages only).
    pub body: Option<String>,
    /// Media URLs (messages only).
    pub media_urls: Vec<String>,
    /// Inline TwiML (calls only).
    pub twiml: Option<String>,
    /// TwiML URL (calls only).
    pub url: Option<String>,
}

/// What the caller gets back for an accepted relay.
#[derive(Debug, Clone)]
pub struct RelayReceipt {
    /// Initial carrier status.
    pub status: String,
    /// Carrier-assigned SID.
    pub sid: String,
    /// Cost charged, in balance units.
    pub cost_units: i64,
    /// Balance after the charge, in balance units.
    pub balance_units: i64,
}

/// Run one relay attempt end to end.
///
/// # Errors
///
/// Maps each pipeline stage failure to the corresponding [`ApiError`];
/// failures after the debit have already been compensated when the error
/// is returned.
pub async fn dispatch(
    state: &AppState,
    identity: &Identity,
    kind: ChannelKind,
    request: SendRequest,
) -> Result<RelayReceipt, ApiError> {
    if !identity.allows(kind) {
        return Err(ApiError::CapabilityDenied(kind));
    }

    let cost = kind.rate_units();

    // Debit first. Everything after this point must refund on failure.
    let balance_after = state.store.debit(&identity.tenant_id, cost)?;

    let mut record = OutcomeRecord::new(identity.tenant_id, identity.credential_id, kind, &request.to);
    record.from_number = request.from.clone();
    record.body = request.body.clone();
    record.charged_units = cost;

    // Rules match on the bare number.
    let route_number = strip_whatsapp_scheme(&request.to).to_string();

    let account = match router::select_account(&*state.store, &state.patterns, identity, &route_number)
    {
        Ok(Some(account)) => account,
        Ok(None) => {
            refund(state, &mut record, cost, "no route");
            record.mark_failed(format!("no route found for {route_number}"));
            persist_outcome(state, &record);
            tracing::info!(to = %route_number, "no route, refunded");
            return Err(ApiError::NoRouteFound(route_number));
        }
        Err(e) => {
            refund(state, &mut record, cost, "routing error");
            record.mark_failed("routing error");
            persist_outcome(state, &record);
            return Err(e);
        }
    };
    record.account_sid = Some(account.sid.clone());

    let auth = match decrypt_credentials(state, &account) {
        Ok(auth) => auth,
        Err(e) => {
            refund(state, &mut record, cost, "configuration error");
            record.mark_failed(e.to_string());
            persist_outcome(state, &record);
            return Err(e);
        }
    };

    let receipt = match send(state, &account, &auth, kind, &request, &mut record).await {
        Ok(receipt) => receipt,
        Err(e) => {
            refund(state, &mut record, cost, "dispatch failed");
            record.mark_failed(e.to_string());
            persist_outcome(state, &record);
            tracing::warn!(
                to = %request.to,
                account_sid = %account.sid,
                error = %e,
                "carrier dispatch failed, refunded"
            );
            return Err(ApiError::DispatchFailed(e.to_string()));
        }
    };

    record.mark_dispatched(&receipt.sid, &receipt.status);
    persist_outcome(state, &record);

    tracing::info!(
        kind = %kind,
        sid = %receipt.sid,
        status = %receipt.status,
        cost_units = cost,
        "relay dispatched"
    );

    Ok(RelayReceipt {
        status: receipt.status,
        sid: receipt.sid,
        cost_units: cost,
        balance_units: balance_after,
    })
}

/// Issue the compensating credit for a failed attempt.
///
/// The record's charge is zeroed so the outcome log and the ledger agree.
/// A credit that itself fails is logged and leaves the charge on the
/// record, so the caller still sees the failure that started the refund.
fn refund(state: &AppState, record: &mut OutcomeRecord, cost: i64, reason: &str) {
    match state.store.credit(&record.tenant_id, cost) {
        Ok(balance) => {
            record.charged_units = 0;
            tracing::debug!(
                tenant_id = %record.tenant_id,
                cost_units = cost,
                balance_units = balance,
                reason,
                "refund issued"
            );
            if let Err(e) = state.store.append_audit(&AuditEntry::new(
                PIPELINE_ACTOR,
                actions::REFUND_ISSUED,
                format!(
                    "refund {cost} units to tenant {} ({reason}, outcome {})",
                    record.tenant_id, record.id
                ),
            )) {
                tracing::error!(outcome_id = %record.id, error = %e, "refund audit entry failed");
            }
        }
        Err(e) => {
            tracing::error!(
                tenant_id = %record.tenant_id,
                cost_units = cost,
                error = %e,
                "refund credit failed, debit stands"
            );
        }
    }
}

/// Write the outcome record without disturbing the pipeline's result.
fn persist_outcome(state: &AppState, record: &OutcomeRecord) {
    if let Err(e) = state.store.put_outcome(record) {
        tracing::error!(outcome_id = %record.id, error = %e, "failed to persist outcome record");
    }
}

/// Build the carrier auth material for an account.
fn decrypt_credentials(
    state: &AppState,
    account: &CarrierAccount,
) -> Result<CarrierCredentials, ApiError> {
    let cipher = state
        .cipher
        .as_ref()
        .ok_or_else(|| ApiError::Configuration("no master encryption key configured".into()))?;

    let token = cipher.decrypt_token(&account.encrypted_token).map_err(|e| {
        tracing::error!(account_sid = %account.sid, error = %e, "carrier token does not decrypt");
        ApiError::Configuration(format!("carrier token for {} does not decrypt", account.sid))
    })?;

    Ok(CarrierCredentials {
        account_sid: account.sid.to_string(),
        token,
    })
}

/// Address the request and hand it to the carrier gateway.
async fn send(
    state: &AppState,
    account: &CarrierAccount,
    auth: &CarrierCredentials,
    kind: ChannelKind,
    request: &SendRequest,
    record: &mut OutcomeRecord,
) -> relay_carrier::Result<relay_carrier::DispatchReceipt> {
    let from = request.from.clone().or_else(|| account.phone_number.clone());

    if kind.is_message() {
        // WhatsApp addressing: both legs carry the scheme.
        let (to, from) = if kind == ChannelKind::Whatsapp {
            (
                with_whatsapp_scheme(&request.to),
                from.map(|f| with_whatsapp_scheme(&f)),
            )
        } else {
            (request.to.clone(), from)
        };

        record.from_number = from.clone();

        state
            .gateway
            .send_message(
                auth,
                &OutboundMessage {
                    to,
                    from,
                    body: request.body.clone().unwrap_or_default(),
                    media_urls: request.media_urls.clone(),
                    status_callback: state.config.status_callback_url.clone(),
                },
            )
            .await
    } else {
        record.from_number = from.clone();

        state
            .gateway
            .place_call(
                auth,
                &OutboundCall {
                    to: request.to.clone(),
                    from,
                    twiml: request.twiml.clone(),
                    url: request.url.clone(),
                    status_callback: state.config.status_callback_url.clone(),
                },
            )
            .await
    }
}
