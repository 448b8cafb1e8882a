//! API handlers.

pub mod admin;
pub mod health;
pub mod messages;
pub mod webhooks;
