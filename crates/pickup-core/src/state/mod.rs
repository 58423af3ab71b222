//! Order status transitions.
//!
//! Status changes are administrative overrides, so the relation below is
//! complete; it is still consulted before every update so that business
//! rules have a single place to live.

pub mod order;

pub use order::{allowed_transitions, is_valid_transition};
