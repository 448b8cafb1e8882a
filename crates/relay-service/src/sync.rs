//! Status reconciliation.
//!
//! Delivery-status callbacks are best effort; a missed callback would
//! otherwise leave an outcome record non-terminal forever. A background
//! sweep polls the carrier for every record that is still in flight
//! within the lookback window and overwrites local state with the
//! carrier's answer. The carrier is the source of truth for status.

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use relay_carrier::{CarrierCredentials, CarrierError};
use relay_core::{OutcomeRecord, STATUS_NOT_FOUND};
use relay_store::Store;

use crate::state::AppState;

/// Handle to the reconciliation background task.
pub struct StatusSync {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl StatusSync {
    /// Spawn the reconciliation loop.
    #[must_use]
    pub fn start(state: Arc<AppState>) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let interval = std::time::Duration::from_secs(state.config.sync_interval_seconds);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = run_sweep(&state).await {
                            tracing::error!(error = %e, "reconciliation sweep failed");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::info!("reconciliation loop stopping");
                        return;
                    }
                }
            }
        });

        Self { handle, shutdown }
    }

    /// Signal shutdown and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

/// Run one reconciliation sweep over all unsettled records.
///
/// Per-record carrier failures are logged and skipped so one bad record
/// cannot stall the sweep; only a store-level failure aborts it.
///
/// # Errors
///
/// Returns an error if the unsettled-record listing fails.
pub async fn run_sweep(state: &AppState) -> relay_store::Result<()> {
    let window = ChronoDuration::days(state.config.sync_window_days);
    let records = state.store.list_unsettled_outcomes(window)?;

    if records.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = records.len(), "reconciling unsettled records");

    let mut updated = 0usize;
    for mut record in records {
        match reconcile_record(state, &mut record).await {
            Ok(true) => {
                state.store.put_outcome(&record)?;
                updated += 1;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(outcome_id = %record.id, error = %e, "reconciliation skipped record");
            }
        }
    }

    if updated > 0 {
        tracing::info!(updated, "reconciliation sweep applied updates");
    }
    Ok(())
}

/// Poll the carrier for one record. Returns whether the record changed.
async fn reconcile_record(
    state: &AppState,
    record: &mut OutcomeRecord,
) -> Result<bool, ReconcileError> {
    let Some(carrier_sid) = record.carrier_sid.clone() else {
        return Ok(false);
    };
    let Some(account_sid) = record.account_sid.clone() else {
        return Ok(false);
    };

    let account = state
        .store
        .get_account(&account_sid)?
        .ok_or(ReconcileError::AccountGone)?;

    let cipher = state.cipher.as_ref().ok_or(ReconcileError::NoCipher)?;
    let token = cipher
        .decrypt_token(&account.encrypted_token)
        .map_err(|_| ReconcileError::BadToken)?;

    let auth = CarrierCredentials {
        account_sid: account.sid.to_string(),
        token,
    };

    match state.gateway.fetch_status(&auth, &carrier_sid, record.kind).await {
        Ok(status) => {
            let changed = record.status != status.status
                || record.error_message != status.error_message
                || status.price_units.is_some();

            record.status = status.status;
            record.error_message = status.error_message;
            if let Some(price) = status.price_units {
                // The carrier's measured price supersedes the flat estimate.
                record.charged_units = price;
            }
            record.updated_at = chrono::Utc::now();
            Ok(changed)
        }
        Err(CarrierError::NotFound) => {
            record.status = STATUS_NOT_FOUND.to_string();
            record.updated_at = chrono::Utc::now();
            Ok(true)
        }
        Err(e) => Err(ReconcileError::Carrier(e)),
    }
}

#[derive(Debug, thiserror::Error)]
enum ReconcileError {
    #[error("carrier account was deleted")]
    AccountGone,

    #[error("no master encryption key configured")]
    NoCipher,

    #[error("carrier token does not decrypt")]
    BadToken,

    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error(transparent)]
    Store(#[from] relay_store::StoreError),
}
