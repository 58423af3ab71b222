//! Text and JSON rendering of orders, plans and stats.
//!
//! Everything here returns a `String`; printing is left to `main` so that
//! stdout carries only rendered output.

use pickup_core::OrderStore;
use pickup_types::{
	truncate_text, CreateOrderResponse, Order, OrderId, OrderScope, OrderStatus, PlanCatalog,
	StatsSnapshot,
};
use serde::Serialize;

const ADDRESS_WIDTH: usize = 32;

/// Orders split into the two views the client shows.
#[derive(Debug, Serialize)]
pub struct OrdersView<'a> {
	pub scope: String,
	pub current: Vec<&'a Order>,
	pub history: Vec<&'a Order>,
}

impl<'a> OrdersView<'a> {
	pub fn new(store: &'a OrderStore, scope: OrderScope) -> Self {
		Self {
			scope: scope.to_string(),
			current: store.current().collect(),
			history: store.history().collect(),
		}
	}
}

/// Pretty JSON for `--json` output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
	serde_json::to_string_pretty(value)
}

pub fn plans(catalog: &PlanCatalog) -> String {
	let mut lines = Vec::new();
	for plan in catalog.plans() {
		let marker = if plan.popular { "  * popular" } else { "" };
		lines.push(format!(
			"{:<10} {:<12} {:<10} {:>8}{}",
			plan.id, plan.name, plan.duration, plan.price, marker
		));
		if !plan.description.is_empty() {
			lines.push(format!("{:11}{}", "", plan.description));
		}
		for feature in &plan.features {
			lines.push(format!("{:11}- {}", "", feature));
		}
	}
	lines.join("\n")
}

fn period(order: &Order) -> String {
	match (order.start_date, order.end_date) {
		(Some(start), Some(end)) => format!("{} - {}", start, end),
		(Some(start), None) => format!("from {}", start),
		_ => "-".to_string(),
	}
}

fn order_line(order: &Order) -> String {
	format!(
		"#{:<5} {:<12} {:>8}  {:<10} {:<23}  {}",
		order.id,
		order.plan_name,
		order.price,
		order.status.label(),
		period(order),
		truncate_text(&order.address, ADDRESS_WIDTH)
	)
}

fn contact_line(order: &Order) -> Option<String> {
	let name = order.user_name.as_deref()?;
	let mut line = format!("{:7}{}", "", name);
	if let Some(email) = order.user_email.as_deref() {
		line.push_str(&format!(" <{}>", email));
	}
	if let Some(phone) = order.user_phone.as_deref() {
		line.push_str(&format!(" {}", phone));
	}
	Some(line)
}

fn section(title: &str, orders: &[&Order], lines: &mut Vec<String>) {
	lines.push(format!("{} ({})", title, orders.len()));
	if orders.is_empty() {
		lines.push(format!("{:7}none", ""));
	}
	for order in orders {
		lines.push(order_line(order));
		lines.extend(contact_line(order));
	}
}

/// Current and history sections of the order list.
pub fn orders(view: &OrdersView<'_>) -> String {
	let mut lines = vec![format!("Orders for {}", view.scope), String::new()];
	section("Current", &view.current, &mut lines);
	lines.push(String::new());
	section("History", &view.history, &mut lines);
	lines.join("\n")
}

pub fn stats(stats: &StatsSnapshot) -> String {
	[
		format!("Total orders: {}", stats.total),
		format!("  {:<10} {}", OrderStatus::Pending.label(), stats.pending),
		format!("  {:<10} {}", OrderStatus::Active.label(), stats.active),
		format!("  {:<10} {}", OrderStatus::Completed.label(), stats.completed),
		format!("Revenue: {}", stats.revenue),
	]
	.join("\n")
}

pub fn created(response: &CreateOrderResponse) -> String {
	match response.order_id {
		Some(order_id) => format!("Order #{} created", order_id),
		None => "Order created".to_string(),
	}
}

pub fn status_changed(order_id: OrderId, status: OrderStatus) -> String {
	format!("Order #{} is now {}", order_id, status.label())
}
