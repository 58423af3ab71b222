//! Order types for the pickup subscription service.
//!
//! Orders are created and persisted by the remote service; the client only
//! ever reads them and requests status changes. The customer listing omits
//! the customer contact fields, so those are optional here.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

use crate::utils::deserialize_timestamp;

/// Server-assigned order identifier.
pub type OrderId = u64;

/// Server-assigned customer identifier.
pub type UserId = u64;

/// A single customer's subscription purchase record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier assigned by the server.
	pub id: OrderId,
	/// Customer name. Only present in the administrative listing.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_name: Option<String>,
	/// Customer email. Only present in the administrative listing.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_email: Option<String>,
	/// Customer phone. Only present in the administrative listing.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_phone: Option<String>,
	/// Pickup address.
	pub address: String,
	/// Display name of the purchased plan.
	pub plan_name: String,
	/// Price of the plan at purchase time.
	pub price: Decimal,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// When the order was created.
	#[serde(default, deserialize_with = "deserialize_timestamp")]
	pub created_at: Option<NaiveDateTime>,
	/// First day of the subscription.
	#[serde(default)]
	pub start_date: Option<NaiveDate>,
	/// Last day of the subscription.
	#[serde(default)]
	pub end_date: Option<NaiveDate>,
}

impl Order {
	/// Orders that still need attention: anything not completed.
	pub fn is_current(&self) -> bool {
		self.status != OrderStatus::Completed
	}

	/// Whether the order counts towards revenue.
	pub fn is_billable(&self) -> bool {
		self.status != OrderStatus::Cancelled
	}
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Initial status of every new order.
	Pending,
	/// Subscription is running.
	Active,
	/// Subscription has ended.
	Completed,
	/// Order was cancelled and no longer counts towards revenue.
	Cancelled,
}

impl OrderStatus {
	/// Wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Active => "active",
			OrderStatus::Completed => "completed",
			OrderStatus::Cancelled => "cancelled",
		}
	}

	/// Human-readable label.
	pub fn label(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending",
			OrderStatus::Active => "Active",
			OrderStatus::Completed => "Completed",
			OrderStatus::Cancelled => "Cancelled",
		}
	}

	/// Returns an iterator over all statuses.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Pending,
			Self::Active,
			Self::Completed,
			Self::Cancelled,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown order status '{0}' (expected pending, active, completed or cancelled)")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
	type Err = ParseStatusError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"pending" => Ok(Self::Pending),
			"active" => Ok(Self::Active),
			"completed" => Ok(Self::Completed),
			"cancelled" => Ok(Self::Cancelled),
			_ => Err(ParseStatusError(s.to_string())),
		}
	}
}

/// Order form submitted by a customer.
///
/// Serializes directly into the creation request body
/// `{ name, email, phone, address, plan_id }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewOrder {
	#[validate(length(min = 1))]
	pub name: String,
	#[validate(length(min = 1))]
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	#[validate(length(min = 1))]
	pub address: String,
	#[validate(length(min = 1))]
	pub plan_id: String,
}

impl NewOrder {
	/// Builds a form from raw input, trimming every field.
	///
	/// A blank phone number is treated as absent.
	pub fn new(
		plan_id: impl Into<String>,
		name: impl Into<String>,
		email: impl Into<String>,
		phone: Option<String>,
		address: impl Into<String>,
	) -> Self {
		let trimmed = |s: String| s.trim().to_string();
		Self {
			name: trimmed(name.into()),
			email: trimmed(email.into()),
			phone: phone.map(trimmed).filter(|p| !p.is_empty()),
			address: trimmed(address.into()),
			plan_id: trimmed(plan_id.into()),
		}
	}

	/// Names of the required fields that are empty, sorted.
	pub fn missing_fields(&self) -> Vec<String> {
		match self.validate() {
			Ok(()) => Vec::new(),
			Err(errors) => {
				let mut fields: Vec<String> = errors
					.field_errors()
					.keys()
					.map(|field| field.to_string())
					.collect();
				fields.sort();
				fields
			},
		}
	}
}

/// Which orders a listing request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
	/// Every order in the system (administrative view).
	Admin,
	/// A single customer's orders, optionally narrowed to one status.
	Customer {
		user_id: UserId,
		status: Option<OrderStatus>,
	},
}

impl OrderScope {
	/// Customer scope without a status filter.
	pub fn customer(user_id: UserId) -> Self {
		Self::Customer {
			user_id,
			status: None,
		}
	}

	/// Query parameters the remote endpoint expects for this scope.
	pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
		match self {
			OrderScope::Admin => vec![("admin", "true".to_string())],
			OrderScope::Customer { user_id, status } => {
				let mut pairs = vec![("user_id", user_id.to_string())];
				if let Some(status) = status {
					pairs.push(("status", status.as_str().to_string()));
				}
				pairs
			},
		}
	}
}

impl fmt::Display for OrderScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderScope::Admin => write!(f, "admin"),
			OrderScope::Customer {
				user_id,
				status: None,
			} => write!(f, "user {}", user_id),
			OrderScope::Customer {
				user_id,
				status: Some(status),
			} => write!(f, "user {} ({})", user_id, status),
		}
	}
}
