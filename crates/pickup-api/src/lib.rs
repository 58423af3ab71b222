//! Orders API module for the pickup ordering client.
//!
//! This module abstracts the remote orders endpoint behind a trait so the
//! client core never talks HTTP directly. Two backends are provided: the
//! real HTTP client and an in-process stand-in with the same semantics,
//! used for offline runs and tests.

use async_trait::async_trait;
use pickup_types::{
	ConfigSchema, CreateOrderResponse, ImplementationRegistry, NewOrder, Order, OrderId,
	OrderScope, OrderStatus, PlanCatalog,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod memory;
}

/// Errors that can occur while talking to the orders API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
	/// The request never produced a response.
	#[error("Network error: {0}")]
	Network(String),
	/// The endpoint answered with a non-success status.
	#[error("Request failed with status {status}: {message}")]
	Status { status: u16, message: String },
	/// The response body could not be understood.
	#[error("Malformed response: {0}")]
	Malformed(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Low-level interface every orders API backend implements.
#[async_trait]
pub trait OrdersApiInterface: Send + Sync {
	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Lists the orders visible in the given scope.
	async fn list_orders(&self, scope: &OrderScope) -> Result<Vec<Order>, ApiError>;

	/// Submits a new order. The created order starts as `pending`.
	async fn create_order(&self, order: &NewOrder) -> Result<CreateOrderResponse, ApiError>;

	/// Sets the status of an existing order.
	async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), ApiError>;
}

/// Type alias for API factory functions.
///
/// Factories receive their raw configuration table and the plan catalog.
pub type ApiFactory =
	fn(&toml::Value, &PlanCatalog) -> Result<Box<dyn OrdersApiInterface>, ApiError>;

/// Registry trait for orders API implementations.
pub trait ApiRegistry: ImplementationRegistry<Factory = ApiFactory> {}

/// Get all registered orders API implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, ApiFactory)> {
	use implementations::{http, memory};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level orders API service wrapping the configured backend.
pub struct OrdersApiService {
	/// The underlying backend implementation.
	backend: Box<dyn OrdersApiInterface>,
}

impl OrdersApiService {
	/// Creates a new OrdersApiService with the specified backend.
	pub fn new(backend: Box<dyn OrdersApiInterface>) -> Self {
		Self { backend }
	}

	/// Fetches the orders in `scope`.
	pub async fn list_orders(&self, scope: &OrderScope) -> Result<Vec<Order>, ApiError> {
		tracing::debug!(component = "api", scope = %scope, "Listing orders");
		let orders = self.backend.list_orders(scope).await?;
		tracing::debug!(component = "api", count = orders.len(), "Received orders");
		Ok(orders)
	}

	/// Submits a new order.
	pub async fn create_order(&self, order: &NewOrder) -> Result<CreateOrderResponse, ApiError> {
		tracing::debug!(component = "api", plan_id = %order.plan_id, "Creating order");
		self.backend.create_order(order).await
	}

	/// Requests a status change.
	pub async fn update_status(
		&self,
		order_id: OrderId,
		status: OrderStatus,
	) -> Result<(), ApiError> {
		tracing::debug!(component = "api", order_id, status = %status, "Updating order status");
		self.backend.update_status(order_id, status).await
	}
}
