//! In-process orders API for offline runs and tests.
//!
//! Mirrors the remote service: customers are upserted by email, new orders
//! start `pending` with a subscription window derived from the plan length,
//! the administrative listing is newest-first and carries contact details,
//! and unknown plans or orders answer 404. Nothing is persisted.

use crate::{ApiError, ApiFactory, ApiRegistry, OrdersApiInterface};
use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use pickup_types::{
	ConfigSchema, CreateOrderResponse, ImplementationRegistry, NewOrder, Order, OrderId,
	OrderScope, OrderStatus, PlanCatalog, Schema, SchemaError, UserId,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Customer {
	id: UserId,
	name: String,
	email: String,
	phone: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredOrder {
	id: OrderId,
	user_id: UserId,
	plan_id: String,
	address: String,
	status: OrderStatus,
	created_at: NaiveDateTime,
	start_date: NaiveDate,
	end_date: NaiveDate,
}

#[derive(Debug, Default)]
struct MemoryState {
	customers: Vec<Customer>,
	orders: Vec<StoredOrder>,
	next_user_id: UserId,
	next_order_id: OrderId,
}

impl MemoryState {
	/// Inserts a customer or refreshes the contact details of an existing one.
	fn upsert_customer(&mut self, order: &NewOrder) -> UserId {
		if let Some(customer) = self.customers.iter_mut().find(|c| c.email == order.email) {
			customer.name = order.name.clone();
			customer.phone = order.phone.clone();
			return customer.id;
		}

		self.next_user_id += 1;
		self.customers.push(Customer {
			id: self.next_user_id,
			name: order.name.clone(),
			email: order.email.clone(),
			phone: order.phone.clone(),
		});
		self.next_user_id
	}

	fn customer(&self, id: UserId) -> Option<&Customer> {
		self.customers.iter().find(|c| c.id == id)
	}
}

fn status_error(status: u16, message: &str) -> ApiError {
	ApiError::Status {
		status,
		message: message.to_string(),
	}
}

/// In-memory orders API.
pub struct MemoryOrdersApi {
	catalog: PlanCatalog,
	state: RwLock<MemoryState>,
}

impl MemoryOrdersApi {
	/// Creates an empty backend selling the plans in `catalog`.
	pub fn new(catalog: PlanCatalog) -> Self {
		Self {
			catalog,
			state: RwLock::new(MemoryState::default()),
		}
	}

	fn to_order(&self, stored: &StoredOrder, customer: Option<&Customer>) -> Order {
		let plan = self.catalog.get(&stored.plan_id);
		Order {
			id: stored.id,
			user_name: customer.map(|c| c.name.clone()),
			user_email: customer.map(|c| c.email.clone()),
			user_phone: customer.and_then(|c| c.phone.clone()),
			address: stored.address.clone(),
			plan_name: plan.map(|p| p.name.clone()).unwrap_or_default(),
			price: plan.map(|p| p.price).unwrap_or_default(),
			status: stored.status,
			created_at: Some(stored.created_at),
			start_date: Some(stored.start_date),
			end_date: Some(stored.end_date),
		}
	}
}

#[async_trait]
impl OrdersApiInterface for MemoryOrdersApi {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryApiSchema)
	}

	async fn list_orders(&self, scope: &OrderScope) -> Result<Vec<Order>, ApiError> {
		let state = self.state.read().await;

		let orders = match scope {
			OrderScope::Admin => {
				let mut stored: Vec<&StoredOrder> = state.orders.iter().collect();
				stored.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
				stored
					.into_iter()
					.map(|o| self.to_order(o, state.customer(o.user_id)))
					.collect()
			},
			OrderScope::Customer { user_id, status } => state
				.orders
				.iter()
				.filter(|o| o.user_id == *user_id)
				.filter(|o| status.is_none_or(|s| o.status == s))
				.map(|o| self.to_order(o, None))
				.collect(),
		};

		Ok(orders)
	}

	async fn create_order(&self, order: &NewOrder) -> Result<CreateOrderResponse, ApiError> {
		if !order.missing_fields().is_empty() {
			return Err(status_error(400, "Missing required fields"));
		}

		let plan = self
			.catalog
			.get(&order.plan_id)
			.ok_or_else(|| status_error(404, "Plan not found"))?;

		let mut state = self.state.write().await;
		let user_id = state.upsert_customer(order);

		let now = Local::now().naive_local();
		let start_date = now.date();
		let end_date = start_date
			.checked_add_days(Days::new(u64::from(plan.duration_days)))
			.ok_or_else(|| status_error(500, "Subscription end date out of range"))?;

		state.next_order_id += 1;
		let order_id = state.next_order_id;
		state.orders.push(StoredOrder {
			id: order_id,
			user_id,
			plan_id: plan.id.clone(),
			address: order.address.clone(),
			status: OrderStatus::Pending,
			created_at: now,
			start_date,
			end_date,
		});

		Ok(CreateOrderResponse {
			success: true,
			order_id: Some(order_id),
			user_id: Some(user_id),
			message: Some("Order created successfully".to_string()),
		})
	}

	async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), ApiError> {
		let mut state = self.state.write().await;
		let stored = state
			.orders
			.iter_mut()
			.find(|o| o.id == order_id)
			.ok_or_else(|| status_error(404, "Order not found"))?;
		stored.status = status;
		Ok(())
	}
}

/// Configuration schema for MemoryOrdersApi.
pub struct MemoryApiSchema;

impl ConfigSchema for MemoryApiSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		// No settings
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function to create the in-memory backend.
///
/// Configuration parameters:
/// - None
pub fn create_api(
	config: &toml::Value,
	catalog: &PlanCatalog,
) -> Result<Box<dyn OrdersApiInterface>, ApiError> {
	MemoryApiSchema
		.validate(config)
		.map_err(|e| ApiError::Configuration(format!("Invalid memory config: {}", e)))?;
	Ok(Box::new(MemoryOrdersApi::new(catalog.clone())))
}

/// Registry for the in-memory backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = ApiFactory;

	fn factory() -> Self::Factory {
		create_api
	}
}

impl ApiRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;

	fn new_order(plan: &str, email: &str) -> NewOrder {
		NewOrder::new(plan, "Ivan Petrov", email, None, "Lenina 1")
	}

	#[tokio::test]
	async fn test_create_sets_pending_and_subscription_window() {
		let api = MemoryOrdersApi::new(PlanCatalog::builtin());

		let created = api
			.create_order(&new_order("1month", "ivan@example.com"))
			.await
			.unwrap();
		assert_eq!(created.order_id, Some(1));
		assert_eq!(created.user_id, Some(1));

		let orders = api.list_orders(&OrderScope::Admin).await.unwrap();
		let order = &orders[0];
		assert_eq!(order.status, OrderStatus::Pending);
		assert_eq!(order.plan_name, "Monthly");
		assert_eq!(order.price, Decimal::from(2990));
		let days = (order.end_date.unwrap() - order.start_date.unwrap()).num_days();
		assert_eq!(days, 30);
		assert_eq!(order.user_email.as_deref(), Some("ivan@example.com"));
	}

	#[tokio::test]
	async fn test_customer_upserted_by_email() {
		let api = MemoryOrdersApi::new(PlanCatalog::builtin());

		let first = api.create_order(&new_order("1day", "a@example.com")).await.unwrap();
		let second = api.create_order(&new_order("1year", "a@example.com")).await.unwrap();
		let other = api.create_order(&new_order("1day", "b@example.com")).await.unwrap();

		assert_eq!(first.user_id, second.user_id);
		assert_ne!(first.user_id, other.user_id);

		let mine = api
			.list_orders(&OrderScope::customer(first.user_id.unwrap()))
			.await
			.unwrap();
		assert_eq!(mine.len(), 2);
		assert!(mine.iter().all(|o| o.user_name.is_none()));
	}

	#[tokio::test]
	async fn test_admin_listing_is_newest_first() {
		let api = MemoryOrdersApi::new(PlanCatalog::builtin());
		for email in ["a@example.com", "b@example.com", "c@example.com"] {
			api.create_order(&new_order("1day", email)).await.unwrap();
		}

		let ids: Vec<OrderId> = api
			.list_orders(&OrderScope::Admin)
			.await
			.unwrap()
			.iter()
			.map(|o| o.id)
			.collect();
		assert_eq!(ids, vec![3, 2, 1]);
	}

	#[tokio::test]
	async fn test_customer_status_filter() {
		let api = MemoryOrdersApi::new(PlanCatalog::builtin());
		api.create_order(&new_order("1day", "a@example.com")).await.unwrap();
		api.create_order(&new_order("1month", "a@example.com")).await.unwrap();
		api.update_status(2, OrderStatus::Active).await.unwrap();

		let active = api
			.list_orders(&OrderScope::Customer {
				user_id: 1,
				status: Some(OrderStatus::Active),
			})
			.await
			.unwrap();
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].id, 2);
	}

	#[tokio::test]
	async fn test_rejections() {
		let api = MemoryOrdersApi::new(PlanCatalog::builtin());

		let err = api
			.create_order(&new_order("2years", "a@example.com"))
			.await
			.unwrap_err();
		assert!(matches!(err, ApiError::Status { status: 404, .. }));

		let blank = NewOrder::new("1day", "Ivan", "a@example.com", None, "");
		let err = api.create_order(&blank).await.unwrap_err();
		assert!(matches!(err, ApiError::Status { status: 400, .. }));

		let err = api.update_status(42, OrderStatus::Active).await.unwrap_err();
		assert_eq!(
			err,
			ApiError::Status {
				status: 404,
				message: "Order not found".to_string()
			}
		);

		// Rejected creates leave no customer behind
		let created = api
			.create_order(&new_order("1day", "b@example.com"))
			.await
			.unwrap();
		assert_eq!(created.user_id, Some(1));
	}
}
