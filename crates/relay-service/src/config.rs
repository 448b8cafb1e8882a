//! Service configuration.

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/relay").
    pub data_dir: String,

    /// Base64-encoded 32-byte master key for carrier token encryption.
    /// A missing key is detected at the point of use, not at startup.
    pub master_key: Option<String>,

    /// Admin API key for the operator surface.
    pub admin_api_key: Option<String>,

    /// Carrier API base URL (default: `https://api.twilio.com`).
    pub carrier_base_url: String,

    /// Timeout for carrier dispatch/fetch calls in seconds.
    pub carrier_timeout_seconds: u64,

    /// URL the carrier should push delivery-status callbacks to.
    pub status_callback_url: Option<String>,

    /// TTL of the key validation cache in seconds. This is the maximum
    /// staleness window for permission changes and revocations.
    pub auth_cache_ttl_seconds: u64,

    /// Interval of the status reconciliation sweep in seconds.
    pub sync_interval_seconds: u64,

    /// How far back (in days) reconciliation looks for unsettled records.
    pub sync_window_days: i64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/relay".into()),
            master_key: std::env::var("MASTER_ENCRYPTION_KEY").ok(),
            admin_api_key: std::env::var("ADMIN_API_KEY").ok(),
            carrier_base_url: std::env::var("CARRIER_BASE_URL")
                .unwrap_or_else(|_| "https://api.twilio.com".into()),
            carrier_timeout_seconds: env_parse("CARRIER_TIMEOUT_SECONDS", 30),
            status_callback_url: std::env::var("STATUS_CALLBACK_URL").ok(),
            auth_cache_ttl_seconds: env_parse("AUTH_CACHE_TTL_SECONDS", 300),
            sync_interval_seconds: env_parse("SYNC_INTERVAL_SECONDS", 60),
            sync_window_days: env_parse("SYNC_WINDOW_DAYS", 7),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES", 1024 * 1024),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS", 30),
        }
    }
}

/// Parse an environment variable, falling back to a default.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/relay".into(),
            master_key: None,
            admin_api_key: None,
            carrier_base_url: "https://api.twilio.com".into(),
            carrier_timeout_seconds: 30,
            status_callback_url: None,
            auth_cache_ttl_seconds: 300,
            sync_interval_seconds: 60,
            sync_window_days: 7,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
