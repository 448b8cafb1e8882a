//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, health, messages, webhooks};
use crate::state::AppState;

/// Maximum concurrent requests for the relay endpoints.
///
/// The relay path holds a carrier HTTP call open per request, so this
/// bounds in-flight carrier connections.
const RELAY_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for the admin surface.
const ADMIN_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Relay (`X-Proxy-Auth` API key)
/// - `POST /relay/api/sms` - Relay an SMS
/// - `POST /relay/api/whatsapp` - Relay a WhatsApp message
/// - `POST /relay/api/call` - Place a voice call
///
/// ## Carrier callbacks (no auth; matched by carrier SID)
/// - `POST /relay/twilio/webhook` - Delivery-status callback
///
/// ## Admin (`X-Admin-Key`)
/// - `POST /v1/tenants`, `GET /v1/tenants/:id`, `POST /v1/tenants/:id/credit`
/// - `POST /v1/tenants/:id/keys`, `GET /v1/tenants/:id/keys`,
///   `DELETE /v1/keys/:id`
/// - `PUT /v1/accounts/:sid`, `GET /v1/accounts`, `DELETE /v1/accounts/:sid`
/// - `POST /v1/rules`, `GET /v1/rules`, `DELETE /v1/rules/:id`
/// - `GET /v1/outcomes`, `GET /v1/audit`
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let relay_routes = Router::new()
        .route("/api/sms", post(messages::relay_sms))
        .route("/api/whatsapp", post(messages::relay_whatsapp))
        .route("/api/call", post(messages::relay_call))
        // Callbacks share the nest but skip auth; the SID lookup is the gate.
        .route("/twilio/webhook", post(webhooks::carrier_callback))
        .layer(ConcurrencyLimitLayer::new(RELAY_MAX_CONCURRENT_REQUESTS));

    let admin_routes = Router::new()
        // Tenants & ledger
        .route("/tenants", post(admin::create_tenant))
        .route("/tenants/:id", get(admin::get_tenant))
        .route("/tenants/:id/credit", post(admin::credit_tenant))
        // Credentials
        .route("/tenants/:id/keys", post(admin::generate_key))
        .route("/tenants/:id/keys", get(admin::list_keys))
        .route("/keys/:id", delete(admin::revoke_key))
        // Carrier accounts
        .route("/accounts", get(admin::list_accounts))
        .route("/accounts/:sid", axum::routing::put(admin::put_account))
        .route("/accounts/:sid", delete(admin::delete_account))
        // Routing rules
        .route("/rules", post(admin::create_rule))
        .route("/rules", get(admin::list_rules))
        .route("/rules/:id", delete(admin::delete_rule))
        // Logs
        .route("/outcomes", get(admin::list_outcomes))
        .route("/audit", get(admin::list_audit))
        .layer(ConcurrencyLimitLayer::new(ADMIN_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/relay", relay_routes)
        .nest("/v1", admin_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
