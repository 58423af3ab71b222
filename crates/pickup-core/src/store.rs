//! The client-side copy of the order list.

use crate::stats::aggregate;
use pickup_types::{Order, OrderId, StatsSnapshot};
use std::collections::HashSet;
use thiserror::Error;

/// Reasons a fetched order list is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
	#[error("Duplicate order id {0} in fetched list")]
	DuplicateId(OrderId),
	#[error("Order {0} has a negative price")]
	NegativePrice(OrderId),
}

/// Last known-good order list together with its statistics.
///
/// The list is only ever replaced wholesale; a rejected list leaves the
/// previous one and its stats untouched.
#[derive(Debug, Default)]
pub struct OrderStore {
	orders: Vec<Order>,
	stats: StatsSnapshot,
}

impl OrderStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Swaps in a freshly fetched list and recomputes the stats.
	pub fn replace(&mut self, orders: Vec<Order>) -> Result<(), StoreError> {
		let mut seen = HashSet::with_capacity(orders.len());
		for order in &orders {
			if !seen.insert(order.id) {
				return Err(StoreError::DuplicateId(order.id));
			}
			if order.price.is_sign_negative() && !order.price.is_zero() {
				return Err(StoreError::NegativePrice(order.id));
			}
		}

		self.stats = aggregate(&orders);
		self.orders = orders;
		Ok(())
	}

	/// Orders in server order.
	pub fn orders(&self) -> &[Order] {
		&self.orders
	}

	pub fn get(&self, order_id: OrderId) -> Option<&Order> {
		self.orders.iter().find(|o| o.id == order_id)
	}

	/// Orders that are not completed yet.
	pub fn current(&self) -> impl Iterator<Item = &Order> {
		self.orders.iter().filter(|o| o.is_current())
	}

	/// Completed orders.
	pub fn history(&self) -> impl Iterator<Item = &Order> {
		self.orders.iter().filter(|o| !o.is_current())
	}

	pub fn stats(&self) -> &StatsSnapshot {
		&self.stats
	}

	pub fn len(&self) -> usize {
		self.orders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.orders.is_empty()
	}
}
