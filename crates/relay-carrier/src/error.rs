//! Error type for carrier gateway operations.

/// Errors returned by the carrier gateway.
#[derive(Debug, thiserror::Error)]
pub enum CarrierError {
    /// The carrier does not know the requested resource.
    ///
    /// Reconciliation maps this to the terminal `not-found` status
    /// rather than treating it as a transient failure.
    #[error("carrier resource not found")]
    NotFound,

    /// The carrier API returned an error response.
    #[error("carrier API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Carrier error code, if the body carried one.
        code: Option<i64>,
        /// Error message.
        message: String,
    },

    /// The HTTP request failed (connect error, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
