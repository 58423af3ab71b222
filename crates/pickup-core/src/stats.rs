//! Stats aggregation over an order list.

use pickup_types::{Order, OrderStatus, StatsSnapshot};

/// Computes counts and revenue for `orders` in a single pass.
///
/// Cancelled orders count towards `total` but not towards `revenue`.
pub fn aggregate(orders: &[Order]) -> StatsSnapshot {
	orders
		.iter()
		.fold(StatsSnapshot::default(), |mut stats, order| {
			stats.total += 1;
			match order.status {
				OrderStatus::Pending => stats.pending += 1,
				OrderStatus::Active => stats.active += 1,
				OrderStatus::Completed => stats.completed += 1,
				OrderStatus::Cancelled => {},
			}
			if order.is_billable() {
				stats.revenue += order.price;
			}
			stats
		})
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use rust_decimal::Decimal;

	pub(crate) fn order(id: u64, price: i64, status: OrderStatus) -> Order {
		Order {
			id,
			user_name: None,
			user_email: None,
			user_phone: None,
			address: "Lenina 1".to_string(),
			plan_name: "Monthly".to_string(),
			price: Decimal::from(price),
			status,
			created_at: None,
			start_date: None,
			end_date: None,
		}
	}

	#[test]
	fn test_mixed_list() {
		let orders = vec![
			order(1, 199, OrderStatus::Pending),
			order(2, 2990, OrderStatus::Active),
			order(3, 990, OrderStatus::Cancelled),
		];

		let stats = aggregate(&orders);
		assert_eq!(stats.total, 3);
		assert_eq!(stats.pending, 1);
		assert_eq!(stats.active, 1);
		assert_eq!(stats.completed, 0);
		assert_eq!(stats.revenue, Decimal::from(3189));
	}

	#[test]
	fn test_empty_list() {
		assert_eq!(aggregate(&[]), StatsSnapshot::default());
	}

	#[test]
	fn test_cancelling_lowers_revenue_once() {
		let mut orders = vec![
			order(1, 2990, OrderStatus::Active),
			order(2, 15990, OrderStatus::Completed),
		];
		let before = aggregate(&orders).revenue;

		orders[0].status = OrderStatus::Cancelled;
		let cancelled = aggregate(&orders).revenue;
		assert!(cancelled < before);
		assert_eq!(before - cancelled, Decimal::from(2990));

		orders[0].status = OrderStatus::Cancelled;
		assert_eq!(aggregate(&orders).revenue, cancelled);
	}

	#[test]
	fn test_counts_bounded_by_total() {
		let statuses: Vec<OrderStatus> = OrderStatus::all().collect();
		for cancelled in [false, true] {
			let orders: Vec<Order> = (0..12u64)
				.map(|i| {
					let status = statuses[(i as usize) % statuses.len()];
					let status = match status {
						OrderStatus::Cancelled if !cancelled => OrderStatus::Pending,
						other => other,
					};
					order(i, 100 + i as i64, status)
				})
				.collect();

			let stats = aggregate(&orders);
			let counted = stats.pending + stats.active + stats.completed;
			assert_eq!(stats.total, orders.len());
			if cancelled {
				assert!(counted < stats.total);
			} else {
				assert_eq!(counted, stats.total);
			}

			let expected: Decimal = orders
				.iter()
				.filter(|o| o.status != OrderStatus::Cancelled)
				.map(|o| o.price)
				.sum();
			assert_eq!(stats.revenue, expected);
		}
	}
}
