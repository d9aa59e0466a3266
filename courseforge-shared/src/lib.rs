//! # Courseforge Shared Library
//!
//! This crate contains the shared types and business logic used across the
//! Courseforge API server and the payout worker.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `db`: Connection pool and migration runner
//! - `auth`: Identity-provider token validation and request auth context
//! - `providers`: Payment and video platform clients + webhook signatures
//! - `fees`: Platform fee calculation
//! - `fulfillment`: Checkout fulfillment and refunds
//! - `payouts`: Creator payout batching
//! - `moderation`: Creator application and course review workflows

pub mod auth;
pub mod db;
pub mod fees;
pub mod fulfillment;
pub mod models;
pub mod moderation;
pub mod payouts;
pub mod providers;

/// Current version of the Courseforge shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
