//! Wire types for the remote orders endpoint.
//!
//! The endpoint answers `GET` with `{ "orders": [...] }`, accepts new orders
//! via `POST` (body: [`NewOrder`](crate::NewOrder)) and status changes via
//! `PUT`. Failures carry `{ "error": "..." }`.

use serde::{Deserialize, Serialize};

use crate::{Order, OrderId, OrderStatus, UserId};

/// Body of a listing response.
///
/// `orders` is optional so that a body without it can be reported as
/// malformed instead of failing deserialization with a generic message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersResponse {
	#[serde(default)]
	pub orders: Option<Vec<Order>>,
}

/// Body of a successful creation response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
	#[serde(default)]
	pub success: bool,
	#[serde(default)]
	pub order_id: Option<OrderId>,
	#[serde(default)]
	pub user_id: Option<UserId>,
	#[serde(default)]
	pub message: Option<String>,
}

/// Body of a status update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	pub order_id: OrderId,
	pub status: OrderStatus,
}

/// Error body returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_orders_field_is_none() {
		let body: OrdersResponse = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
		assert!(body.orders.is_none());

		let body: OrdersResponse = serde_json::from_str(r#"{"orders": []}"#).unwrap();
		assert_eq!(body.orders.map(|o| o.len()), Some(0));
	}

	#[test]
	fn test_update_request_body() {
		let body = serde_json::to_value(UpdateStatusRequest {
			order_id: 5,
			status: OrderStatus::Completed,
		})
		.unwrap();
		assert_eq!(body, serde_json::json!({"order_id": 5, "status": "completed"}));
	}

	#[test]
	fn test_create_response_tolerates_partial_body() {
		let body: CreateOrderResponse =
			serde_json::from_str(r#"{"success": true, "order_id": 12}"#).unwrap();
		assert_eq!(body.order_id, Some(12));
		assert!(body.user_id.is_none());
	}
}
