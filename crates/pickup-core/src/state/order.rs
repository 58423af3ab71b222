//! Transition table for order statuses.

use once_cell::sync::Lazy;
use pickup_types::OrderStatus;
use std::collections::{HashMap, HashSet};

// Every status may move to every status, itself included
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	OrderStatus::all()
		.map(|from| (from, OrderStatus::all().collect()))
		.collect()
});

/// Checks whether an order in `from` may be set to `to`.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|allowed| allowed.contains(&to))
}

/// Statuses reachable from `from`, in lifecycle order.
pub fn allowed_transitions(from: OrderStatus) -> Vec<OrderStatus> {
	OrderStatus::all()
		.filter(|to| is_valid_transition(from, *to))
		.collect()
}
