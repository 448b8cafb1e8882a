//! API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_core::{format_units, ChannelKind, RelayError};
use relay_store::StoreError;
use serde_json::json;

/// Errors returned by API handlers, mapped onto HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid, or revoked credentials.
    #[error("authentication failure")]
    Unauthorized,

    /// Valid key, but its capability flag for this channel is disabled.
    #[error("capability disabled for channel: {0}")]
    CapabilityDenied(ChannelKind),

    /// The balance does not cover the estimated cost.
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Current balance in units.
        balance: i64,
        /// Required amount in units.
        required: i64,
    },

    /// No routing rule matched the destination.
    #[error("no routing rule matched destination: {0}")]
    NoRouteFound(String),

    /// The carrier rejected the dispatch or was unreachable.
    #[error("carrier dispatch failed: {0}")]
    DispatchFailed(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operator-side misconfiguration (missing master key, undecryptable
    /// carrier token). Distinct from `Internal` so operators can tell the
    /// two apart in the error code.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal server error. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::CapabilityDenied(_) => StatusCode::FORBIDDEN,
            Self::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            Self::NoRouteFound(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DispatchFailed(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::CapabilityDenied(_) => "capability_disabled",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::NoRouteFound(_) => "no_route_found",
            Self::DispatchFailed(_) => "dispatch_failed",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            // Do not leak internal detail to callers.
            Self::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        if let Self::InsufficientFunds { balance, required } = &self {
            body["error"]["details"] = json!({
                "balance": format_units(*balance),
                "required": format_units(*required),
            });
        }

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id}")),
            StoreError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::AuthenticationFailure => Self::Unauthorized,
            RelayError::CapabilityDenied { kind } => Self::CapabilityDenied(kind),
            RelayError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            RelayError::NoRouteFound { to } => Self::NoRouteFound(to),
            RelayError::DispatchFailure(detail) => Self::DispatchFailed(detail),
            RelayError::Configuration(detail) => Self::Configuration(detail),
            RelayError::InvalidId(e) => Self::BadRequest(e.to_string()),
            RelayError::Storage(detail) => Self::Internal(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_maps_to_402() {
        let err = ApiError::InsufficientFunds {
            balance: 100,
            required: 75,
        };
        assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.code(), "insufficient_funds");
    }

    #[test]
    fn internal_error_hides_detail() {
        let response = ApiError::Internal("rocksdb went away".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let err: ApiError = StoreError::NotFound {
            entity: "tenant",
            id: "abc".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
