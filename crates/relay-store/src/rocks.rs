//! `RocksDB` storage implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use relay_core::{
    AccountSid, AuditEntry, CarrierAccount, Credential, CredentialId, OutcomeId, OutcomeRecord,
    RoutingRule, RuleId, Tenant, TenantId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{OutcomeFilter, Store};

/// RocksDB-backed storage implementation.
///
/// Ledger mutations take a per-tenant mutex spanning the
/// read-compare-write, which is the row-lock equivalent `RocksDB` itself
/// does not provide. The lock table is keyed by tenant, so different
/// tenants never contend.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    tenant_locks: Mutex<HashMap<TenantId, Arc<Mutex<()>>>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            tenant_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Get (or create) the mutex guarding a tenant's balance.
    fn tenant_lock(&self, tenant_id: &TenantId) -> Arc<Mutex<()>> {
        let mut locks = self
            .tenant_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(*tenant_id).or_default())
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Apply a balance delta under the tenant's critical section.
    ///
    /// `check_funds` enables the debit-side balance comparison.
    fn adjust_balance(&self, tenant_id: &TenantId, delta: i64, check_funds: bool) -> Result<i64> {
        let lock = self.tenant_lock(tenant_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut tenant =
            self.get_tenant(tenant_id)?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "tenant",
                    id: tenant_id.to_string(),
                })?;

        if check_funds && tenant.balance_units < -delta {
            return Err(StoreError::InsufficientFunds {
                balance: tenant.balance_units,
                required: -delta,
            });
        }

        tenant.balance_units += delta;
        tenant.updated_at = chrono::Utc::now();

        let cf = self.cf(cf::TENANTS)?;
        let value = Self::serialize(&tenant)?;
        self.db
            .put_cf(&cf, keys::tenant_key(tenant_id), value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(tenant.balance_units)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Tenants & Ledger
    // =========================================================================

    fn put_tenant(&self, tenant: &Tenant) -> Result<()> {
        let cf = self.cf(cf::TENANTS)?;
        let value = Self::serialize(tenant)?;
        self.db
            .put_cf(&cf, keys::tenant_key(&tenant.id), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_tenant(&self, tenant_id: &TenantId) -> Result<Option<Tenant>> {
        let cf = self.cf(cf::TENANTS)?;
        self.db
            .get_cf(&cf, keys::tenant_key(tenant_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn debit(&self, tenant_id: &TenantId, amount_units: i64) -> Result<i64> {
        self.adjust_balance(tenant_id, -amount_units, true)
    }

    fn credit(&self, tenant_id: &TenantId, amount_units: i64) -> Result<i64> {
        self.adjust_balance(tenant_id, amount_units, false)
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    fn put_credential(&self, credential: &Credential) -> Result<()> {
        let cf_cred = self.cf(cf::CREDENTIALS)?;
        let cf_digest = self.cf(cf::CREDENTIALS_BY_DIGEST)?;

        let value = Self::serialize(credential)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_cred, keys::credential_key(&credential.id), value);
        batch.put_cf(
            &cf_digest,
            keys::digest_key(&credential.key_digest),
            credential.id.as_bytes(),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_credential(&self, credential_id: &CredentialId) -> Result<Option<Credential>> {
        let cf = self.cf(cf::CREDENTIALS)?;
        self.db
            .get_cf(&cf, keys::credential_key(credential_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn resolve_credential(&self, digest: &str) -> Result<Option<Credential>> {
        let cf_digest = self.cf(cf::CREDENTIALS_BY_DIGEST)?;

        let Some(id_bytes) = self
            .db
            .get_cf(&cf_digest, keys::digest_key(digest))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let id_bytes: [u8; 16] = id_bytes
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Serialization("malformed digest index entry".into()))?;
        let credential_id = CredentialId::from_uuid(uuid::Uuid::from_bytes(id_bytes));

        Ok(self
            .get_credential(&credential_id)?
            .filter(|credential| credential.is_active))
    }

    fn revoke_credential(&self, credential_id: &CredentialId) -> Result<()> {
        let mut credential =
            self.get_credential(credential_id)?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "credential",
                    id: credential_id.to_string(),
                })?;
        credential.revoke();
        self.put_credential(&credential)
    }

    fn list_credentials(&self, tenant_id: &TenantId) -> Result<Vec<Credential>> {
        let cf = self.cf(cf::CREDENTIALS)?;
        let mut credentials = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let credential: Credential = Self::deserialize(&value)?;
            if credential.tenant_id == *tenant_id {
                credentials.push(credential);
            }
        }

        Ok(credentials)
    }

    // =========================================================================
    // Carrier Accounts & Routing Rules
    // =========================================================================

    fn put_account(&self, account: &CarrierAccount) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let value = Self::serialize(account)?;
        self.db
            .put_cf(&cf, keys::account_key(&account.sid), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_account(&self, sid: &AccountSid) -> Result<Option<CarrierAccount>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        self.db
            .get_cf(&cf, keys::account_key(sid))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn delete_account(&self, sid: &AccountSid) -> Result<()> {
        if self.get_account(sid)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "carrier account",
                id: sid.to_string(),
            });
        }

        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_rules = self.cf(cf::RULES)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_accounts, keys::account_key(sid));

        // Rules cascade with the account
        for rule in self.list_rules()? {
            if rule.account_sid == *sid {
                tracing::debug!(rule_id = %rule.id, account_sid = %sid, "Cascading rule delete");
                batch.delete_cf(&cf_rules, keys::rule_key(&rule.id));
            }
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_accounts(&self) -> Result<Vec<CarrierAccount>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let mut accounts = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            accounts.push(Self::deserialize(&value)?);
        }

        Ok(accounts)
    }

    fn put_rule(&self, rule: &RoutingRule) -> Result<()> {
        let cf = self.cf(cf::RULES)?;
        let value = Self::serialize(rule)?;
        self.db
            .put_cf(&cf, keys::rule_key(&rule.id), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn delete_rule(&self, rule_id: &RuleId) -> Result<()> {
        let cf = self.cf(cf::RULES)?;
        let key = keys::rule_key(rule_id);

        let exists = self
            .db
            .get_cf(&cf, &key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound {
                entity: "routing rule",
                id: rule_id.to_string(),
            });
        }

        self.db
            .delete_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_rules(&self) -> Result<Vec<RoutingRule>> {
        let cf = self.cf(cf::RULES)?;
        let mut rules = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            rules.push(Self::deserialize::<RoutingRule>(&value)?);
        }

        rules.sort_by_key(|rule| rule.priority);
        Ok(rules)
    }

    // =========================================================================
    // Outcome Log
    // =========================================================================

    fn put_outcome(&self, record: &OutcomeRecord) -> Result<()> {
        let cf_outcomes = self.cf(cf::OUTCOMES)?;
        let value = Self::serialize(record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_outcomes, keys::outcome_key(record.id), value);

        if let Some(carrier_sid) = &record.carrier_sid {
            let cf_by_sid = self.cf(cf::OUTCOMES_BY_SID)?;
            batch.put_cf(
                &cf_by_sid,
                keys::outcome_sid_key(carrier_sid),
                record.id.to_bytes(),
            );
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_outcome(&self, outcome_id: OutcomeId) -> Result<Option<OutcomeRecord>> {
        let cf = self.cf(cf::OUTCOMES)?;
        self.db
            .get_cf(&cf, keys::outcome_key(outcome_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_outcome_by_carrier_sid(&self, carrier_sid: &str) -> Result<Option<OutcomeRecord>> {
        let cf_by_sid = self.cf(cf::OUTCOMES_BY_SID)?;

        let Some(id_bytes) = self
            .db
            .get_cf(&cf_by_sid, keys::outcome_sid_key(carrier_sid))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let id_bytes: [u8; 16] = id_bytes
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Serialization("malformed SID index entry".into()))?;

        self.get_outcome(OutcomeId::from_bytes(id_bytes))
    }

    fn list_unsettled_outcomes(&self, window: chrono::Duration) -> Result<Vec<OutcomeRecord>> {
        let cf = self.cf(cf::OUTCOMES)?;
        let cutoff = chrono::Utc::now() - window;
        let mut records = Vec::new();

        // Outcome keys are ULIDs, so reverse iteration is newest-first and
        // can stop at the window boundary.
        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let record: OutcomeRecord = Self::deserialize(&value)?;
            if record.created_at < cutoff {
                break;
            }
            if !record.is_settled() {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn query_outcomes(&self, filter: &OutcomeFilter) -> Result<Vec<OutcomeRecord>> {
        let cf = self.cf(cf::OUTCOMES)?;
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut records = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let record: OutcomeRecord = Self::deserialize(&value)?;

            if filter.kind.is_some_and(|kind| record.kind != kind) {
                continue;
            }
            if filter.tenant_id.is_some_and(|id| record.tenant_id != id) {
                continue;
            }
            if filter
                .status
                .as_deref()
                .is_some_and(|status| record.status != status)
            {
                continue;
            }
            if let Some(needle) = &search {
                let sid_match = record
                    .carrier_sid
                    .as_deref()
                    .is_some_and(|sid| sid.to_lowercase().contains(needle));
                let to_match = record.to_number.to_lowercase().contains(needle);
                let body_match = record
                    .body
                    .as_deref()
                    .is_some_and(|body| body.to_lowercase().contains(needle));
                if !(sid_match || to_match || body_match) {
                    continue;
                }
            }

            records.push(record);
            if filter.limit > 0 && records.len() >= filter.limit {
                break;
            }
        }

        Ok(records)
    }

    // =========================================================================
    // Audit Log
    // =========================================================================

    fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        let cf = self.cf(cf::AUDIT)?;
        let value = Self::serialize(entry)?;
        self.db
            .put_cf(&cf, keys::audit_key(entry.id), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_audit(&self, search: Option<&str>, limit: usize) -> Result<Vec<AuditEntry>> {
        let cf = self.cf(cf::AUDIT)?;
        let needle = search.map(str::to_lowercase);
        let mut entries = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let entry: AuditEntry = Self::deserialize(&value)?;

            if let Some(needle) = &needle {
                if !entry.action.to_lowercase().contains(needle)
                    && !entry.details.to_lowercase().contains(needle)
                {
                    continue;
                }
            }

            entries.push(entry);
            if limit > 0 && entries.len() >= limit {
                break;
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{ChannelKind, Credential};
    use tempfile::TempDir;

    fn open_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn funded_tenant(store: &RocksStore, balance_units: i64) -> Tenant {
        let mut tenant = Tenant::new("test");
        tenant.balance_units = balance_units;
        store.put_tenant(&tenant).unwrap();
        tenant
    }

    #[test]
    fn debit_and_credit_roundtrip() {
        let (store, _dir) = open_store();
        let tenant = funded_tenant(&store, 1_000);

        let after_debit = store.debit(&tenant.id, 75).unwrap();
        assert_eq!(after_debit, 925);

        let after_credit = store.credit(&tenant.id, 75).unwrap();
        assert_eq!(after_credit, 1_000);
    }

    #[test]
    fn debit_rejects_insufficient_funds_without_mutation() {
        let (store, _dir) = open_store();
        let tenant = funded_tenant(&store, 50);

        let err = store.debit(&tenant.id, 75).unwrap_err();
        match err {
            StoreError::InsufficientFunds { balance, required } => {
                assert_eq!(balance, 50);
                assert_eq!(required, 75);
            }
            other => panic!("unexpected error: {other}"),
        }

        let reloaded = store.get_tenant(&tenant.id).unwrap().unwrap();
        assert_eq!(reloaded.balance_units, 50);
    }

    #[test]
    fn debit_on_unknown_tenant_is_not_found() {
        let (store, _dir) = open_store();
        let err = store.debit(&TenantId::generate(), 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn concurrent_debits_never_overspend() {
        let (store, _dir) = open_store();
        // Balance covers exactly 4 debits of 75
        let tenant = funded_tenant(&store, 300);
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = std::sync::Arc::clone(&store);
            let tenant_id = tenant.id;
            handles.push(std::thread::spawn(move || store.debit(&tenant_id, 75).is_ok()));
        }

        let successes = handles
            .into_iter()
            .filter(|h| matches!(h.join(), Ok(true)))
            .count();

        assert_eq!(successes, 4);
        let reloaded = store.get_tenant(&tenant.id).unwrap().unwrap();
        assert_eq!(reloaded.balance_units, 0);
    }

    #[test]
    fn resolve_credential_by_digest_skips_revoked() {
        let (store, _dir) = open_store();
        let tenant = funded_tenant(&store, 0);
        let (credential, secret) = Credential::generate(tenant.id, None);
        store.put_credential(&credential).unwrap();

        let digest = relay_core::key_digest(&secret);
        let resolved = store.resolve_credential(&digest).unwrap().unwrap();
        assert_eq!(resolved.id, credential.id);

        store.revoke_credential(&credential.id).unwrap();
        assert!(store.resolve_credential(&digest).unwrap().is_none());

        // The record itself survives for log references
        let kept = store.get_credential(&credential.id).unwrap().unwrap();
        assert!(!kept.is_active);
    }

    #[test]
    fn deleting_an_account_cascades_its_rules() {
        let (store, _dir) = open_store();
        let sid_a: AccountSid = "ACaaa".parse().unwrap();
        let sid_b: AccountSid = "ACbbb".parse().unwrap();

        for sid in [&sid_a, &sid_b] {
            let now = chrono::Utc::now();
            store
                .put_account(&CarrierAccount {
                    sid: sid.clone(),
                    encrypted_token: String::new(),
                    name: String::new(),
                    phone_number: None,
                    description: String::new(),
                    capability_sms: true,
                    capability_voice: true,
                    capability_whatsapp: true,
                    created_at: now,
                    updated_at: now,
                })
                .unwrap();
        }

        store
            .put_rule(&RoutingRule::new(1, r"^\+1.*", sid_a.clone()))
            .unwrap();
        store
            .put_rule(&RoutingRule::new(2, ".*", sid_b.clone()))
            .unwrap();

        store.delete_account(&sid_a).unwrap();

        let rules = store.list_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].account_sid, sid_b);
    }

    #[test]
    fn rules_list_ascending_by_priority() {
        let (store, _dir) = open_store();
        let sid: AccountSid = "ACccc".parse().unwrap();

        store.put_rule(&RoutingRule::new(20, "b", sid.clone())).unwrap();
        store.put_rule(&RoutingRule::new(5, "a", sid.clone())).unwrap();
        store.put_rule(&RoutingRule::new(10, "c", sid)).unwrap();

        let priorities: Vec<i32> = store
            .list_rules()
            .unwrap()
            .iter()
            .map(|rule| rule.priority)
            .collect();
        assert_eq!(priorities, vec![5, 10, 20]);
    }

    #[test]
    fn outcome_sid_index_finds_records() {
        let (store, _dir) = open_store();
        let mut record = OutcomeRecord::new(
            TenantId::generate(),
            CredentialId::generate(),
            ChannelKind::Sms,
            "+15551234567",
        );
        record.mark_dispatched("SM0001", "queued");
        store.put_outcome(&record).unwrap();

        let found = store.find_outcome_by_carrier_sid("SM0001").unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert!(store.find_outcome_by_carrier_sid("SM9999").unwrap().is_none());
    }

    #[test]
    fn unsettled_listing_excludes_terminal_and_undispatched() {
        let (store, _dir) = open_store();
        let tenant_id = TenantId::generate();
        let credential_id = CredentialId::generate();

        let mut queued =
            OutcomeRecord::new(tenant_id, credential_id, ChannelKind::Sms, "+1555000001");
        queued.mark_dispatched("SM1", "queued");
        store.put_outcome(&queued).unwrap();

        let mut delivered =
            OutcomeRecord::new(tenant_id, credential_id, ChannelKind::Sms, "+1555000002");
        delivered.mark_dispatched("SM2", "delivered");
        store.put_outcome(&delivered).unwrap();

        // Never dispatched: no SID to poll
        let failed = OutcomeRecord::new(tenant_id, credential_id, ChannelKind::Sms, "+1555000003");
        store.put_outcome(&failed).unwrap();

        let unsettled = store
            .list_unsettled_outcomes(chrono::Duration::days(7))
            .unwrap();
        assert_eq!(unsettled.len(), 1);
        assert_eq!(unsettled[0].carrier_sid.as_deref(), Some("SM1"));
    }

    #[test]
    fn outcome_query_filters_and_search() {
        let (store, _dir) = open_store();
        let tenant_a = TenantId::generate();
        let tenant_b = TenantId::generate();
        let credential_id = CredentialId::generate();

        let mut sms = OutcomeRecord::new(tenant_a, credential_id, ChannelKind::Sms, "+1555000001");
        sms.body = Some("hello world".to_string());
        sms.mark_dispatched("SMabc", "sent");
        store.put_outcome(&sms).unwrap();

        let mut call = OutcomeRecord::new(tenant_b, credential_id, ChannelKind::Call, "+4420000000");
        call.mark_dispatched("CAdef", "ringing");
        store.put_outcome(&call).unwrap();

        let by_kind = store
            .query_outcomes(&OutcomeFilter {
                kind: Some(ChannelKind::Call),
                ..OutcomeFilter::default()
            })
            .unwrap();
        assert_eq!(by_kind.len(), 1);
        assert_eq!(by_kind[0].kind, ChannelKind::Call);

        let by_tenant = store
            .query_outcomes(&OutcomeFilter {
                tenant_id: Some(tenant_a),
                ..OutcomeFilter::default()
            })
            .unwrap();
        assert_eq!(by_tenant.len(), 1);

        let by_search = store
            .query_outcomes(&OutcomeFilter {
                search: Some("HELLO".to_string()),
                ..OutcomeFilter::default()
            })
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].carrier_sid.as_deref(), Some("SMabc"));

        let limited = store
            .query_outcomes(&OutcomeFilter {
                limit: 1,
                ..OutcomeFilter::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn audit_log_is_searchable_newest_first() {
        let (store, _dir) = open_store();
        store
            .append_audit(&AuditEntry::new("admin", "key_generated", "prefix abc"))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        store
            .append_audit(&AuditEntry::new("relay", "refund_issued", "dispatch failed"))
            .unwrap();

        let all = store.list_audit(None, 0).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].action, "refund_issued");

        let refunds = store.list_audit(Some("refund"), 0).unwrap();
        assert_eq!(refunds.len(), 1);
    }
}
