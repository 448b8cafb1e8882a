//! Application state.

use std::sync::Arc;
use std::time::Duration;

use relay_carrier::{CarrierGateway, HttpCarrier};
use relay_store::Store;

use crate::cache::KeyCache;
use crate::config::ServiceConfig;
use crate::crypto::TokenCipher;
use crate::router::PatternCache;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// The carrier gateway dispatches go through.
    pub gateway: Arc<dyn CarrierGateway>,

    /// Key validation cache for the relay auth path.
    pub key_cache: Arc<KeyCache>,

    /// Compiled routing pattern cache.
    pub patterns: Arc<PatternCache>,

    /// Carrier token cipher (None if no master key is configured).
    pub cipher: Option<Arc<TokenCipher>>,
}

impl AppState {
    /// Create a new application state with an HTTP carrier gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the carrier HTTP client cannot be built.
    pub fn new(
        store: Arc<dyn Store>,
        config: ServiceConfig,
    ) -> Result<Self, relay_carrier::CarrierError> {
        let gateway = HttpCarrier::new(
            &config.carrier_base_url,
            Some(Duration::from_secs(config.carrier_timeout_seconds)),
        )?;
        Ok(Self::with_gateway(store, config, Arc::new(gateway)))
    }

    /// Create application state with an explicit carrier gateway.
    #[must_use]
    pub fn with_gateway(
        store: Arc<dyn Store>,
        config: ServiceConfig,
        gateway: Arc<dyn CarrierGateway>,
    ) -> Self {
        let cipher = config.master_key.as_ref().and_then(|key| {
            match TokenCipher::from_base64_key(key) {
                Ok(cipher) => Some(Arc::new(cipher)),
                Err(e) => {
                    tracing::error!(error = %e, "invalid master encryption key");
                    None
                }
            }
        });

        if cipher.is_none() {
            tracing::warn!(
                "no master encryption key configured - carrier accounts cannot be used"
            );
        }

        let key_cache = Arc::new(KeyCache::new(Duration::from_secs(
            config.auth_cache_ttl_seconds,
        )));

        Self {
            store,
            config,
            gateway,
            key_cache,
            patterns: Arc::new(PatternCache::default()),
            cipher,
        }
    }
}
