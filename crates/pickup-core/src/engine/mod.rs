//! Order lifecycle controller.
//!
//! The controller is the single writer of the local order list. Every write
//! goes to the orders API first and is followed by exactly one full reload,
//! so the store never holds optimistic edits and nothing has to be rolled
//! back when a request fails.

use crate::state::is_valid_transition;
use crate::store::{OrderStore, StoreError};
use pickup_api::{ApiError, OrdersApiService};
use pickup_types::{
	CreateOrderResponse, NewOrder, Order, OrderId, OrderScope, OrderStatus, PlanCatalog,
	StatsSnapshot,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors returned by controller operations.
///
/// None of these leave the store modified: the previous order list stays in
/// place whatever went wrong.
#[derive(Debug, Error)]
pub enum ControllerError {
	/// Required form fields are empty.
	#[error("Missing required fields: {}", .fields.join(", "))]
	Validation { fields: Vec<String> },
	/// The order names a plan that is not in the catalog.
	#[error("Unknown plan '{0}'")]
	UnknownPlan(String),
	/// The transition table does not allow the requested status.
	#[error("Order {order_id} cannot move from {from} to {to}")]
	InvalidTransition {
		order_id: OrderId,
		from: OrderStatus,
		to: OrderStatus,
	},
	#[error(transparent)]
	Api(#[from] ApiError),
	#[error(transparent)]
	Store(#[from] StoreError),
	/// The write succeeded but the follow-up reload did not.
	#[error("Change was saved but the order list could not be refreshed: {0}")]
	StaleAfterWrite(#[source] Box<ControllerError>),
}

/// Drives orders through their lifecycle against the orders API.
pub struct OrderController {
	api: OrdersApiService,
	catalog: Arc<PlanCatalog>,
	store: OrderStore,
	/// Scope of the last successful load; reloads reuse it.
	scope: OrderScope,
}

impl OrderController {
	/// Creates a controller with an empty store. `scope` is used by
	/// [`reload`](Self::reload) until a load with another scope succeeds.
	pub fn new(api: OrdersApiService, catalog: Arc<PlanCatalog>, scope: OrderScope) -> Self {
		Self {
			api,
			catalog,
			store: OrderStore::new(),
			scope,
		}
	}

	/// Fetches the orders in `scope` and replaces the local list.
	///
	/// On failure the previous list, its stats and the remembered scope are
	/// all kept.
	#[instrument(skip_all, fields(scope = %scope))]
	pub async fn load_orders(&mut self, scope: OrderScope) -> Result<(), ControllerError> {
		let orders = match self.api.list_orders(&scope).await {
			Ok(orders) => orders,
			Err(e) => {
				tracing::warn!(
					component = "controller",
					error = %e,
					"Failed to load orders, keeping previous list"
				);
				return Err(e.into());
			},
		};

		if let Err(e) = self.store.replace(orders) {
			tracing::warn!(
				component = "controller",
				error = %e,
				"Rejected fetched order list, keeping previous list"
			);
			return Err(e.into());
		}

		self.scope = scope;
		tracing::info!(
			component = "controller",
			count = self.store.len(),
			"Loaded orders"
		);
		Ok(())
	}

	/// Reloads the remembered scope.
	pub async fn reload(&mut self) -> Result<(), ControllerError> {
		let scope = self.scope;
		self.load_orders(scope).await
	}

	/// Validates and submits a new order, then reloads the current view.
	///
	/// Nothing is sent when a required field is empty or the plan is unknown.
	/// Once the server accepts the order its response is returned even if the
	/// reload fails; the previous list then stays until the next reload.
	#[instrument(skip_all, fields(plan_id = %order.plan_id))]
	pub async fn create_order(
		&mut self,
		order: NewOrder,
	) -> Result<CreateOrderResponse, ControllerError> {
		let fields = order.missing_fields();
		if !fields.is_empty() {
			tracing::debug!(component = "controller", ?fields, "Rejected incomplete order form");
			return Err(ControllerError::Validation { fields });
		}
		if !self.catalog.contains(&order.plan_id) {
			return Err(ControllerError::UnknownPlan(order.plan_id));
		}

		let created = self.api.create_order(&order).await.map_err(|e| {
			tracing::warn!(component = "controller", error = %e, "Failed to create order");
			ControllerError::from(e)
		})?;
		tracing::info!(
			component = "controller",
			order_id = ?created.order_id,
			user_id = ?created.user_id,
			"Order created"
		);

		if let Err(e) = self.refresh_after_write().await {
			tracing::warn!(
				component = "controller",
				order_id = ?created.order_id,
				error = %e,
				"Order created but list is stale"
			);
		}
		Ok(created)
	}

	/// Sets the status of an order and refreshes the list from the server.
	///
	/// When the order is in the local list the transition is checked first.
	#[instrument(skip_all, fields(order_id = order_id, status = %status))]
	pub async fn update_status(
		&mut self,
		order_id: OrderId,
		status: OrderStatus,
	) -> Result<(), ControllerError> {
		if let Some(current) = self.store.get(order_id) {
			if !is_valid_transition(current.status, status) {
				return Err(ControllerError::InvalidTransition {
					order_id,
					from: current.status,
					to: status,
				});
			}
		}

		self.api
			.update_status(order_id, status)
			.await
			.map_err(|e| {
				tracing::warn!(
					component = "controller",
					order_id,
					error = %e,
					"Failed to update order status"
				);
				ControllerError::from(e)
			})?;
		tracing::info!(component = "controller", order_id, status = %status, "Status updated");

		self.refresh_after_write().await
	}

	async fn refresh_after_write(&mut self) -> Result<(), ControllerError> {
		self.reload()
			.await
			.map_err(|e| ControllerError::StaleAfterWrite(Box::new(e)))
	}

	pub fn store(&self) -> &OrderStore {
		&self.store
	}

	pub fn orders(&self) -> &[Order] {
		self.store.orders()
	}

	pub fn stats(&self) -> &StatsSnapshot {
		self.store.stats()
	}

	pub fn catalog(&self) -> &PlanCatalog {
		&self.catalog
	}

	/// Scope of the last successful load, or the initial one.
	pub fn scope(&self) -> OrderScope {
		self.scope
	}
}
