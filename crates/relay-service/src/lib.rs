//! Communications Relay HTTP API Service.
//!
//! This crate provides the HTTP API for the relay, including:
//!
//! - The request-admission pipeline (auth, debit, route, dispatch)
//! - Admin CRUD for tenants, credentials, carrier accounts, and rules
//! - The delivery-status callback
//! - The background status reconciliation task
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Relay API keys** (`X-Proxy-Auth`) - Tenant credentials validated
//!    through the key validation cache
//! 2. **Admin API key** (`X-Admin-Key`) - For the operator surface

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async for consistency

pub mod auth;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod router;
pub mod routes;
pub mod state;
pub mod sync;

pub use cache::KeyCache;
pub use config::ServiceConfig;
pub use crypto::TokenCipher;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use sync::StatusSync;
