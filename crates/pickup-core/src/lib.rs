//! Core of the pickup ordering client.
//!
//! Owns the fetched order list and everything derived from it. The
//! [`OrderController`] is the only writer: it validates requests locally,
//! forwards them to the orders API and refreshes the [`OrderStore`] from the
//! server after every write, so statistics are always recomputed from ground
//! truth rather than patched in place.

pub mod builder;
pub mod engine;
pub mod state;
pub mod stats;
pub mod store;

pub use builder::{BuilderError, ControllerBuilder};
pub use engine::{ControllerError, OrderController};
pub use state::{allowed_transitions, is_valid_transition};
pub use stats::aggregate;
pub use store::{OrderStore, StoreError};
