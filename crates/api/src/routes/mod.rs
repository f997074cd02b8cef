//! HTTP route handlers.

pub mod accounts;
pub mod authorize;
pub mod health;
pub mod metrics;
