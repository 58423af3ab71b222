//! Subcommands of the `pickup` binary.

use crate::render::{self, OrdersView};
use clap::Subcommand;
use pickup_core::OrderController;
use pickup_types::{NewOrder, OrderId, OrderScope, OrderStatus, UpdateStatusRequest, UserId};
use std::error::Error;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// List the subscription plans
	Plans,
	/// List orders, split into current and history
	Orders {
		/// Show every order in the system
		#[arg(long, conflicts_with = "user_id")]
		admin: bool,
		/// Show the orders of this customer
		#[arg(long)]
		user_id: Option<UserId>,
		/// Only orders with this status (customer listings)
		#[arg(long, conflicts_with = "admin")]
		status: Option<OrderStatus>,
	},
	/// Show order statistics over all orders
	Stats,
	/// Place a new order
	Create {
		/// Plan identifier, see `pickup plans`
		#[arg(long)]
		plan: String,
		#[arg(long)]
		name: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		phone: Option<String>,
		/// Pickup address
		#[arg(long)]
		address: String,
	},
	/// Change the status of an order
	SetStatus {
		order_id: OrderId,
		/// pending, active, completed or cancelled
		status: OrderStatus,
	},
}

/// Picks the listing scope from the flags, falling back to the configured one.
pub fn resolve_scope(
	default: OrderScope,
	admin: bool,
	user_id: Option<UserId>,
	status: Option<OrderStatus>,
) -> Result<OrderScope, String> {
	let base = match (admin, user_id) {
		(true, _) => OrderScope::Admin,
		(false, Some(user_id)) => OrderScope::customer(user_id),
		(false, None) => default,
	};

	match (base, status) {
		(scope, None) => Ok(scope),
		(OrderScope::Customer { user_id, .. }, Some(status)) => Ok(OrderScope::Customer {
			user_id,
			status: Some(status),
		}),
		(OrderScope::Admin, Some(_)) => {
			Err("--status filters a customer listing; pass --user-id".to_string())
		},
	}
}

/// Runs `command` and returns what should be printed on stdout.
pub async fn run(
	command: Command,
	controller: &mut OrderController,
	json: bool,
) -> Result<String, Box<dyn Error>> {
	match command {
		Command::Plans => {
			let catalog = controller.catalog();
			if json {
				Ok(render::to_json(catalog.plans())?)
			} else {
				Ok(render::plans(catalog))
			}
		},
		Command::Orders {
			admin,
			user_id,
			status,
		} => {
			let scope = resolve_scope(controller.scope(), admin, user_id, status)?;
			controller.load_orders(scope).await?;

			let view = OrdersView::new(controller.store(), scope);
			if json {
				Ok(render::to_json(&view)?)
			} else {
				Ok(render::orders(&view))
			}
		},
		Command::Stats => {
			controller.load_orders(OrderScope::Admin).await?;
			if json {
				Ok(render::to_json(controller.stats())?)
			} else {
				Ok(render::stats(controller.stats()))
			}
		},
		Command::Create {
			plan,
			name,
			email,
			phone,
			address,
		} => {
			let form = NewOrder::new(plan, name, email, phone, address);
			let created = controller.create_order(form).await?;
			if json {
				Ok(render::to_json(&created)?)
			} else {
				Ok(render::created(&created))
			}
		},
		Command::SetStatus { order_id, status } => {
			// Load first so the transition can be checked against the known status
			if let Err(e) = controller.reload().await {
				tracing::warn!(error = %e, "Could not load orders before status update");
			}
			controller.update_status(order_id, status).await?;

			if json {
				match controller.store().get(order_id) {
					Some(order) => Ok(render::to_json(order)?),
					// Orders outside the current scope are not in the reloaded list
					None => Ok(render::to_json(&UpdateStatusRequest { order_id, status })?),
				}
			} else {
				Ok(render::status_changed(order_id, status))
			}
		},
	}
}
