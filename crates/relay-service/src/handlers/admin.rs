//! Operator surface handlers.
//!
//! Everything here sits behind [`AdminAuth`]. Mutations append audit
//! entries naming the acting admin.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use relay_core::{
    actions, format_units, parse_units, AccountSid, AuditEntry, CarrierAccount, ChannelKind,
    Credential, CredentialId, OutcomeRecord, RoutingRule, RuleId, Tenant, TenantId,
};
use relay_store::{OutcomeFilter, Store};

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for log listings.
const DEFAULT_LOG_LIMIT: usize = 50;

/// Hard cap on log listings.
const MAX_LOG_LIMIT: usize = 500;

// =============================================================================
// Tenants & Ledger
// =============================================================================

/// Create tenant request.
#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    /// Display name.
    pub name: String,
    /// Opening balance as a decimal string (default zero).
    pub initial_balance: Option<String>,
}

/// Tenant response.
#[derive(Debug, Serialize)]
pub struct TenantResponse {
    /// Tenant ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Balance as a 4-decimal string.
    pub balance: String,
    /// Whether the tenant is active.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Tenant> for TenantResponse {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id.to_string(),
            name: tenant.name.clone(),
            balance: format_units(tenant.balance_units),
            is_active: tenant.is_active,
            created_at: tenant.created_at.to_rfc3339(),
        }
    }
}

/// `POST /v1/tenants`
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<TenantResponse>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".into()));
    }

    let mut tenant = Tenant::new(request.name.trim());
    if let Some(balance) = &request.initial_balance {
        tenant.balance_units =
            parse_units(balance).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }
    state.store.put_tenant(&tenant)?;

    tracing::info!(tenant_id = %tenant.id, "tenant created");
    Ok((StatusCode::CREATED, Json(TenantResponse::from(&tenant))))
}

/// `GET /v1/tenants/:id`
pub async fn get_tenant(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<TenantResponse>, ApiError> {
    let tenant_id = parse_id::<TenantId>(&id)?;
    let tenant = state
        .store
        .get_tenant(&tenant_id)?
        .ok_or_else(|| ApiError::NotFound(format!("tenant {id}")))?;
    Ok(Json(TenantResponse::from(&tenant)))
}

/// Credit request.
#[derive(Debug, Deserialize)]
pub struct CreditRequest {
    /// Amount to add, as a decimal string.
    pub amount: String,
}

/// Balance response after a credit.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Balance as a 4-decimal string.
    pub balance: String,
}

/// `POST /v1/tenants/:id/credit`
pub async fn credit_tenant(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<String>,
    Json(request): Json<CreditRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let tenant_id = parse_id::<TenantId>(&id)?;
    let amount = parse_units(&request.amount).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if amount <= 0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }

    let balance = state.store.credit(&tenant_id, amount)?;

    state.store.append_audit(&AuditEntry::new(
        &auth.admin_id,
        actions::BALANCE_ADJUSTED,
        format!("credit {amount} units to tenant {tenant_id}"),
    ))?;

    tracing::info!(%tenant_id, amount_units = amount, "balance credited");
    Ok(Json(BalanceResponse {
        balance: format_units(balance),
    }))
}

// =============================================================================
// Credentials
// =============================================================================

/// Key generation request.
#[derive(Debug, Deserialize, Default)]
pub struct GenerateKeyRequest {
    /// Optional forced carrier account, bypassing routing rules.
    pub forced_account: Option<String>,
}

/// The one-time response carrying the plaintext secret.
#[derive(Debug, Serialize)]
pub struct GeneratedKeyResponse {
    /// Credential ID.
    pub id: String,
    /// The plaintext secret. Shown exactly once.
    pub secret: String,
    /// Display prefix.
    pub prefix: String,
}

/// Credential listing entry (no secret material).
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    /// Credential ID.
    pub id: String,
    /// Display prefix.
    pub prefix: String,
    /// SMS capability.
    pub allow_sms: bool,
    /// Voice capability.
    pub allow_voice: bool,
    /// WhatsApp capability.
    pub allow_whatsapp: bool,
    /// Forced account SID, if set.
    pub forced_account: Option<String>,
    /// Whether the key is active.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Credential> for KeyResponse {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.to_string(),
            prefix: credential.prefix.clone(),
            allow_sms: credential.allow_sms,
            allow_voice: credential.allow_voice,
            allow_whatsapp: credential.allow_whatsapp,
            forced_account: credential.forced_account.as_ref().map(ToString::to_string),
            is_active: credential.is_active,
            created_at: credential.created_at.to_rfc3339(),
        }
    }
}

/// `POST /v1/tenants/:id/keys`
pub async fn generate_key(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<String>,
    Json(request): Json<GenerateKeyRequest>,
) -> Result<(StatusCode, Json<GeneratedKeyResponse>), ApiError> {
    let tenant_id = parse_id::<TenantId>(&id)?;
    state
        .store
        .get_tenant(&tenant_id)?
        .ok_or_else(|| ApiError::NotFound(format!("tenant {id}")))?;

    let forced_account = request
        .forced_account
        .as_deref()
        .map(parse_id::<AccountSid>)
        .transpose()?;

    let (credential, secret) = Credential::generate(tenant_id, forced_account);
    state.store.put_credential(&credential)?;

    state.store.append_audit(&AuditEntry::new(
        &auth.admin_id,
        actions::KEY_GENERATED,
        format!("key {} for tenant {tenant_id}", credential.id),
    ))?;

    tracing::info!(credential_id = %credential.id, %tenant_id, "key generated");
    Ok((
        StatusCode::CREATED,
        Json(GeneratedKeyResponse {
            id: credential.id.to_string(),
            secret,
            prefix: credential.prefix,
        }),
    ))
}

/// `GET /v1/tenants/:id/keys`
pub async fn list_keys(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Vec<KeyResponse>>, ApiError> {
    let tenant_id = parse_id::<TenantId>(&id)?;
    let credentials = state.store.list_credentials(&tenant_id)?;
    Ok(Json(credentials.iter().map(KeyResponse::from).collect()))
}

/// `DELETE /v1/keys/:id`
pub async fn revoke_key(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let credential_id = parse_id::<CredentialId>(&id)?;
    state.store.revoke_credential(&credential_id)?;

    // Drop the whole validation cache so the revoked key is rejected
    // immediately rather than at TTL expiry.
    state.key_cache.clear().await;

    state.store.append_audit(&AuditEntry::new(
        &auth.admin_id,
        actions::KEY_REVOKED,
        format!("key {credential_id} revoked"),
    ))?;

    tracing::info!(%credential_id, "key revoked");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Carrier Accounts
// =============================================================================

/// Carrier account upsert request.
#[derive(Debug, Deserialize)]
pub struct PutAccountRequest {
    /// Plaintext auth token; encrypted before storage.
    pub token: String,
    /// Friendly name.
    pub name: String,
    /// Default sender number.
    pub phone_number: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// SMS capability (default true).
    #[serde(default = "default_true")]
    pub capability_sms: bool,
    /// Voice capability (default true).
    #[serde(default = "default_true")]
    pub capability_voice: bool,
    /// WhatsApp capability (default true).
    #[serde(default = "default_true")]
    pub capability_whatsapp: bool,
}

fn default_true() -> bool {
    true
}

/// Carrier account response. The token never appears.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account SID.
    pub sid: String,
    /// Friendly name.
    pub name: String,
    /// Default sender number.
    pub phone_number: Option<String>,
    /// Free-form description.
    pub description: String,
    /// SMS capability.
    pub capability_sms: bool,
    /// Voice capability.
    pub capability_voice: bool,
    /// WhatsApp capability.
    pub capability_whatsapp: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&CarrierAccount> for AccountResponse {
    fn from(account: &CarrierAccount) -> Self {
        Self {
            sid: account.sid.to_string(),
            name: account.name.clone(),
            phone_number: account.phone_number.clone(),
            description: account.description.clone(),
            capability_sms: account.capability_sms,
            capability_voice: account.capability_voice,
            capability_whatsapp: account.capability_whatsapp,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// `PUT /v1/accounts/:sid`
pub async fn put_account(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(sid): Path<String>,
    Json(request): Json<PutAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let sid = parse_id::<AccountSid>(&sid)?;
    if request.token.is_empty() {
        return Err(ApiError::BadRequest("token is required".into()));
    }

    let cipher = state
        .cipher
        .as_ref()
        .ok_or_else(|| ApiError::Configuration("no master encryption key configured".into()))?;
    let encrypted_token = cipher
        .encrypt_token(&request.token)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let now = chrono::Utc::now();
    let created_at = state
        .store
        .get_account(&sid)?
        .map_or(now, |existing| existing.created_at);

    let account = CarrierAccount {
        sid: sid.clone(),
        encrypted_token,
        name: request.name,
        phone_number: request.phone_number,
        description: request.description,
        capability_sms: request.capability_sms,
        capability_voice: request.capability_voice,
        capability_whatsapp: request.capability_whatsapp,
        created_at,
        updated_at: now,
    };
    state.store.put_account(&account)?;

    state.store.append_audit(&AuditEntry::new(
        &auth.admin_id,
        actions::ACCOUNT_SAVED,
        format!("carrier account {sid} saved"),
    ))?;

    tracing::info!(account_sid = %sid, "carrier account saved");
    Ok(Json(AccountResponse::from(&account)))
}

/// `GET /v1/accounts`
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.store.list_accounts()?;
    Ok(Json(accounts.iter().map(AccountResponse::from).collect()))
}

/// `DELETE /v1/accounts/:sid`
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(sid): Path<String>,
) -> Result<StatusCode, ApiError> {
    let sid = parse_id::<AccountSid>(&sid)?;
    state.store.delete_account(&sid)?;

    state.store.append_audit(&AuditEntry::new(
        &auth.admin_id,
        actions::ACCOUNT_DELETED,
        format!("carrier account {sid} deleted"),
    ))?;

    tracing::info!(account_sid = %sid, "carrier account deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Routing Rules
// =============================================================================

/// Rule creation request.
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    /// Evaluation order; lower wins.
    pub priority: i32,
    /// Destination pattern (anchored at the start on evaluation).
    pub pattern: String,
    /// Target account SID.
    pub account_sid: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Rule response.
#[derive(Debug, Serialize)]
pub struct RuleResponse {
    /// Rule ID.
    pub id: String,
    /// Evaluation order.
    pub priority: i32,
    /// Destination pattern.
    pub pattern: String,
    /// Target account SID.
    pub account_sid: String,
    /// Free-form description.
    pub description: String,
}

impl From<&RoutingRule> for RuleResponse {
    fn from(rule: &RoutingRule) -> Self {
        Self {
            id: rule.id.to_string(),
            priority: rule.priority,
            pattern: rule.pattern.clone(),
            account_sid: rule.account_sid.to_string(),
            description: rule.description.clone(),
        }
    }
}

/// `POST /v1/rules`
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Json(request): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<RuleResponse>), ApiError> {
    crate::router::validate_pattern(&request.pattern)?;

    let account_sid = parse_id::<AccountSid>(&request.account_sid)?;
    state
        .store
        .get_account(&account_sid)?
        .ok_or_else(|| ApiError::NotFound(format!("account {account_sid}")))?;

    let mut rule = RoutingRule::new(request.priority, request.pattern, account_sid);
    rule.description = request.description;
    state.store.put_rule(&rule)?;

    state.store.append_audit(&AuditEntry::new(
        &auth.admin_id,
        actions::RULE_CREATED,
        format!(
            "rule {} priority {} pattern {} -> {}",
            rule.id, rule.priority, rule.pattern, rule.account_sid
        ),
    ))?;

    tracing::info!(rule_id = %rule.id, "routing rule created");
    Ok((StatusCode::CREATED, Json(RuleResponse::from(&rule))))
}

/// `GET /v1/rules`
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Result<Json<Vec<RuleResponse>>, ApiError> {
    let rules = state.store.list_rules()?;
    Ok(Json(rules.iter().map(RuleResponse::from).collect()))
}

/// `DELETE /v1/rules/:id`
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let rule_id = parse_id::<RuleId>(&id)?;
    state.store.delete_rule(&rule_id)?;

    state.store.append_audit(&AuditEntry::new(
        &auth.admin_id,
        actions::RULE_DELETED,
        format!("rule {rule_id} deleted"),
    ))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Logs
// =============================================================================

/// Outcome log query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct OutcomeQuery {
    /// Restrict to one channel kind.
    pub kind: Option<ChannelKind>,
    /// Restrict to one tenant.
    pub tenant_id: Option<String>,
    /// Restrict to one status.
    pub status: Option<String>,
    /// Substring search over SID, destination, and body.
    pub search: Option<String>,
    /// Page size (default 50, max 500).
    pub limit: Option<usize>,
}

/// Outcome record response.
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    /// Record ID.
    pub id: String,
    /// Billed tenant.
    pub tenant_id: String,
    /// Channel kind.
    pub kind: ChannelKind,
    /// Destination number.
    pub to: String,
    /// Sender used, if any.
    pub from: Option<String>,
    /// Carrier SID, if dispatched.
    pub sid: Option<String>,
    /// Carrier account, if routed.
    pub account_sid: Option<String>,
    /// Current status.
    pub status: String,
    /// Charge as a 4-decimal string.
    pub charged: String,
    /// Error text, if failed.
    pub error_message: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl From<&OutcomeRecord> for OutcomeResponse {
    fn from(record: &OutcomeRecord) -> Self {
        Self {
            id: record.id.to_string(),
            tenant_id: record.tenant_id.to_string(),
            kind: record.kind,
            to: record.to_number.clone(),
            from: record.from_number.clone(),
            sid: record.carrier_sid.clone(),
            account_sid: record.account_sid.as_ref().map(ToString::to_string),
            status: record.status.clone(),
            charged: format_units(record.charged_units),
            error_message: record.error_message.clone(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// `GET /v1/outcomes`
pub async fn list_outcomes(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Query(query): Query<OutcomeQuery>,
) -> Result<Json<Vec<OutcomeResponse>>, ApiError> {
    let filter = OutcomeFilter {
        kind: query.kind,
        tenant_id: query
            .tenant_id
            .as_deref()
            .map(parse_id::<TenantId>)
            .transpose()?,
        status: query.status,
        search: query.search,
        limit: query
            .limit
            .unwrap_or(DEFAULT_LOG_LIMIT)
            .min(MAX_LOG_LIMIT),
    };

    let records = state.store.query_outcomes(&filter)?;
    Ok(Json(records.iter().map(OutcomeResponse::from).collect()))
}

/// Audit log query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct AuditQuery {
    /// Substring search over action and details.
    pub search: Option<String>,
    /// Page size (default 50, max 500).
    pub limit: Option<usize>,
}

/// Audit entry response.
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    /// Entry ID.
    pub id: String,
    /// Acting admin (or `relay` for pipeline events).
    pub actor: String,
    /// Action name.
    pub action: String,
    /// Details.
    pub details: String,
    /// Timestamp.
    pub created_at: String,
}

/// `GET /v1/audit`
pub async fn list_audit(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);
    let entries = state.store.list_audit(query.search.as_deref(), limit)?;

    Ok(Json(
        entries
            .iter()
            .map(|entry| AuditResponse {
                id: entry.id.to_string(),
                actor: entry.actor.clone(),
                action: entry.action.clone(),
                details: entry.details.clone(),
                created_at: entry.created_at.to_rfc3339(),
            })
            .collect(),
    ))
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_id<T: FromStr>(input: &str) -> Result<T, ApiError>
where
    T::Err: std::fmt::Display,
{
    input
        .parse()
        .map_err(|e: T::Err| ApiError::BadRequest(e.to_string()))
}
