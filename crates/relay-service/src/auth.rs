//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `RelayAuth` - Tenant authentication via `X-Proxy-Auth` API key
//! - `AdminAuth` - Admin authentication for the operator surface
//!
//! Relay authentication consults the key validation cache before falling
//! back to the store, so the hot path costs a single in-memory lookup.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use relay_core::{key_digest, Identity};
use relay_store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated relay caller, resolved from its API key.
#[derive(Debug, Clone)]
pub struct RelayAuth {
    /// The resolved identity of the caller.
    pub identity: Identity,
}

impl FromRequestParts<Arc<AppState>> for RelayAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let secret = parts
                .headers
                .get("x-proxy-auth")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(ApiError::Unauthorized)?;

            // Only the digest travels past this point.
            let digest = key_digest(secret);

            if let Some(identity) = state.key_cache.lookup(&digest).await {
                return Ok(RelayAuth { identity });
            }

            let credential = state
                .store
                .resolve_credential(&digest)
                .map_err(|e| ApiError::Internal(e.to_string()))?
                .ok_or(ApiError::Unauthorized)?;

            let identity = Identity::from(&credential);
            state.key_cache.store(digest, identity.clone()).await;

            Ok(RelayAuth { identity })
        })
    }
}

/// Admin authentication via the `X-Admin-Key` header.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Admin identifier (for audit logging).
    pub admin_id: String,
}

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let admin_key = parts
                .headers
                .get("x-admin-key")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            let expected_key = state
                .config
                .admin_api_key
                .as_ref()
                .ok_or(ApiError::Unauthorized)?;

            if admin_key != expected_key {
                return Err(ApiError::Unauthorized);
            }

            let admin_id = parts
                .headers
                .get("x-admin-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("admin")
                .to_string();

            Ok(AdminAuth { admin_id })
        })
    }
}
