//! Carrier gateway collaborator for the communications relay.
//!
//! The [`CarrierGateway`] trait is the relay's single external-network
//! dependency: dispatching a message or call and re-fetching the status
//! of earlier dispatches. [`HttpCarrier`] implements it over the
//! carrier's Twilio-style REST API; tests swap in mock servers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod gateway;
pub mod http;

pub use error::CarrierError;
pub use gateway::{
    CarrierCredentials, CarrierGateway, DispatchReceipt, OutboundCall, OutboundMessage,
    ResourceStatus,
};
pub use http::HttpCarrier;

/// Result type for carrier operations.
pub type Result<T> = std::result::Result<T, CarrierError>;
