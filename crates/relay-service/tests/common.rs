//! Common test utilities for relay integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

use relay_service::{create_router, AppState, ServiceConfig};
use relay_store::RocksStore;

/// The admin key every harness is configured with.
pub const ADMIN_KEY: &str = "test-admin-key";

/// The carrier auth token uploaded for test accounts.
pub const CARRIER_TOKEN: &str = "test-carrier-token";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Mock carrier the service dispatches against.
    pub carrier: MockServer,
    /// Direct store handle for assertions.
    pub store: Arc<RocksStore>,
    /// Shared application state (for driving reconciliation sweeps).
    pub state: AppState,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and mock carrier.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let carrier = MockServer::start().await;

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            master_key: Some(STANDARD.encode([7u8; 32])),
            admin_api_key: Some(ADMIN_KEY.to_string()),
            carrier_base_url: carrier.uri(),
            carrier_timeout_seconds: 5,
            status_callback_url: None,
            auth_cache_ttl_seconds: 300,
            sync_interval_seconds: 3600,
            sync_window_days: 7,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::clone(&store) as Arc<dyn relay_store::Store>, config)
            .expect("Failed to build state");
        let router: Router = create_router(state.clone());

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            carrier,
            store,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Create a tenant through the admin API and return its ID.
    pub async fn create_tenant(&self, name: &str, balance: &str) -> String {
        let response = self
            .server
            .post("/v1/tenants")
            .add_header("x-admin-key", ADMIN_KEY)
            .json(&json!({ "name": name, "initial_balance": balance }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["id"].as_str().expect("tenant id").to_string()
    }

    /// Generate an API key for a tenant and return the plaintext secret.
    pub async fn generate_key(&self, tenant_id: &str) -> String {
        let response = self
            .server
            .post(&format!("/v1/tenants/{tenant_id}/keys"))
            .add_header("x-admin-key", ADMIN_KEY)
            .json(&json!({}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["secret"].as_str().expect("key secret").to_string()
    }

    /// Upload a carrier account through the admin API.
    pub async fn put_account(&self, sid: &str, phone_number: &str) {
        self.server
            .put(&format!("/v1/accounts/{sid}"))
            .add_header("x-admin-key", ADMIN_KEY)
            .json(&json!({
                "token": CARRIER_TOKEN,
                "name": format!("account {sid}"),
                "phone_number": phone_number,
            }))
            .await
            .assert_status_ok();
    }

    /// Create a routing rule through the admin API and return its ID.
    pub async fn create_rule(&self, priority: i32, pattern: &str, account_sid: &str) -> String {
        let response = self
            .server
            .post("/v1/rules")
            .add_header("x-admin-key", ADMIN_KEY)
            .json(&json!({
                "priority": priority,
                "pattern": pattern,
                "account_sid": account_sid,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["id"].as_str().expect("rule id").to_string()
    }

    /// Fetch a tenant's balance string through the admin API.
    pub async fn tenant_balance(&self, tenant_id: &str) -> String {
        let response = self
            .server
            .get(&format!("/v1/tenants/{tenant_id}"))
            .add_header("x-admin-key", ADMIN_KEY)
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["balance"].as_str().expect("balance").to_string()
    }
}

/// A carrier message-creation response body.
pub fn message_created(sid: &str) -> serde_json::Value {
    json!({
        "sid": sid,
        "status": "queued",
        "price": null,
    })
}

/// A carrier call-creation response body.
pub fn call_created(sid: &str) -> serde_json::Value {
    json!({
        "sid": sid,
        "status": "initiated",
        "price": null,
    })
}
