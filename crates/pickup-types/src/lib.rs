//! Common types for the waste-pickup ordering client.
//!
//! This crate holds the domain and wire types shared by every other crate in
//! the workspace: orders and their lifecycle status, the subscription plan
//! catalog, derived statistics, and the small configuration-schema framework
//! that API implementations use to validate their settings.

/// Wire types for the remote orders endpoint.
pub mod api;
/// Orders, order status, new-order forms and listing scopes.
pub mod order;
/// Subscription plans and the immutable plan catalog.
pub mod plan;
/// Self-registration trait for pluggable implementations.
pub mod registry;
/// Configuration schema validation for implementation tables.
pub mod schema;
/// Derived order statistics.
pub mod stats;
/// Serde helpers and small formatting utilities.
pub mod utils;

pub use api::*;
pub use order::*;
pub use plan::*;
pub use registry::ImplementationRegistry;
pub use schema::*;
pub use stats::StatsSnapshot;
pub use utils::{deserialize_timestamp, truncate_text};
