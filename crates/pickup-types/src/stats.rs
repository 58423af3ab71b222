//! Derived order statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate counts and revenue over an order list.
///
/// Always derived from the current list, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
	/// Number of orders in the list.
	pub total: usize,
	/// Orders with status `pending`.
	pub pending: usize,
	/// Orders with status `active`.
	pub active: usize,
	/// Orders with status `completed`.
	pub completed: usize,
	/// Sum of prices over every order that is not cancelled.
	pub revenue: Decimal,
}
