//! Key validation cache.
//!
//! Successful credential lookups are cached by key digest for a bounded
//! TTL so the hot relay path avoids a store read per request. Revocation
//! clears the cache, so a revoked key is rejected immediately rather
//! than after TTL expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use relay_core::Identity;
use tokio::sync::RwLock;

struct CacheEntry {
    identity: Identity,
    expires_at: Instant,
}

/// TTL cache mapping key digests to resolved identities.
pub struct KeyCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl KeyCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up an identity by key digest. Expired entries miss.
    pub async fn lookup(&self, digest: &str) -> Option<Identity> {
        let entries = self.entries.read().await;
        let entry = entries.get(digest)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.identity.clone())
    }

    /// Cache a resolved identity under its key digest.
    pub async fn store(&self, digest: String, identity: Identity) {
        let mut entries = self.entries.write().await;
        // Opportunistically drop expired entries so the map does not
        // grow unbounded under key churn.
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            digest,
            CacheEntry {
                identity,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Remove a single digest from the cache.
    pub async fn invalidate(&self, digest: &str) {
        self.entries.write().await.remove(digest);
    }

    /// Drop all cached entries. Used on revocation and permission edits.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{CredentialId, TenantId};

    fn identity() -> Identity {
        Identity {
            credential_id: CredentialId::generate(),
            tenant_id: TenantId::generate(),
            allow_sms: true,
            allow_voice: true,
            allow_whatsapp: true,
            forced_account: None,
        }
    }

    #[tokio::test]
    async fn lookup_hits_within_ttl() {
        let cache = KeyCache::new(Duration::from_secs(60));
        let id = identity();
        cache.store("digest-a".into(), id.clone()).await;
        let hit = cache.lookup("digest-a").await.unwrap();
        assert_eq!(hit.tenant_id, id.tenant_id);
    }

    #[tokio::test]
    async fn expired_entries_miss() {
        let cache = KeyCache::new(Duration::ZERO);
        cache.store("digest-b".into(), identity()).await;
        assert!(cache.lookup("digest-b").await.is_none());
    }

    #[tokio::test]
    async fn clear_evicts_everything() {
        let cache = KeyCache::new(Duration::from_secs(60));
        cache.store("digest-c".into(), identity()).await;
        cache.clear().await;
        assert!(cache.lookup("digest-c").await.is_none());
    }
}
