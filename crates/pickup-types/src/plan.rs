//! Subscription plans and the plan catalog.
//!
//! The catalog is assembled once at startup (from configuration or the
//! built-in table below) and shared read-only afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// A purchasable subscription tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
	/// Identifier sent as `plan_id` when ordering.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Human-readable duration, e.g. "1 month".
	pub duration: String,
	/// Length of the subscription in days.
	pub duration_days: u32,
	/// Price of the plan.
	pub price: Decimal,
	/// Short marketing description.
	#[serde(default)]
	pub description: String,
	/// Bullet-point features.
	#[serde(default)]
	pub features: Vec<String>,
	/// Highlighted as the recommended plan.
	#[serde(default)]
	pub popular: bool,
}

/// Errors raised while assembling a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
	#[error("Plan id cannot be empty")]
	EmptyId,
	#[error("Duplicate plan id '{0}'")]
	DuplicateId(String),
	#[error("Plan '{0}' must last at least one day")]
	ZeroDuration(String),
	#[error("Plan '{0}' has a negative price")]
	NegativePrice(String),
}

/// Immutable table of subscription plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
	plans: Vec<SubscriptionPlan>,
}

impl PlanCatalog {
	/// Builds a catalog, rejecting empty or duplicate ids, zero-day
	/// durations and negative prices.
	pub fn new(plans: Vec<SubscriptionPlan>) -> Result<Self, CatalogError> {
		let mut seen = HashSet::new();
		for plan in &plans {
			if plan.id.trim().is_empty() {
				return Err(CatalogError::EmptyId);
			}
			if !seen.insert(plan.id.as_str()) {
				return Err(CatalogError::DuplicateId(plan.id.clone()));
			}
			if plan.duration_days == 0 {
				return Err(CatalogError::ZeroDuration(plan.id.clone()));
			}
			if plan.price.is_sign_negative() {
				return Err(CatalogError::NegativePrice(plan.id.clone()));
			}
		}
		Ok(Self { plans })
	}

	/// The catalog the service ships with.
	pub fn builtin() -> Self {
		Self {
			plans: builtin_plans(),
		}
	}

	/// Looks up a plan by id.
	pub fn get(&self, id: &str) -> Option<&SubscriptionPlan> {
		self.plans.iter().find(|plan| plan.id == id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.get(id).is_some()
	}

	/// Plans in catalog order.
	pub fn plans(&self) -> &[SubscriptionPlan] {
		&self.plans
	}

	pub fn len(&self) -> usize {
		self.plans.len()
	}

	pub fn is_empty(&self) -> bool {
		self.plans.is_empty()
	}
}

impl Default for PlanCatalog {
	fn default() -> Self {
		Self::builtin()
	}
}

/// Built-in plans: trial, monthly, half-year and annual.
pub fn builtin_plans() -> Vec<SubscriptionPlan> {
	let plan = |id: &str,
	            name: &str,
	            duration: &str,
	            duration_days: u32,
	            price: i64,
	            description: &str,
	            features: &[&str],
	            popular: bool| SubscriptionPlan {
		id: id.to_string(),
		name: name.to_string(),
		duration: duration.to_string(),
		duration_days,
		price: Decimal::from(price),
		description: description.to_string(),
		features: features.iter().map(|f| f.to_string()).collect(),
		popular,
	};

	vec![
		plan(
			"1day",
			"Trial",
			"1 day",
			1,
			199,
			"Try the service",
			&["1 pickup", "Eco-friendly disposal", "24/7 support"],
			false,
		),
		plan(
			"1month",
			"Monthly",
			"1 month",
			30,
			2990,
			"The best way to start",
			&[
				"8 pickups per month",
				"Eco-friendly disposal",
				"24/7 support",
				"5% discount",
			],
			true,
		),
		plan(
			"6months",
			"Half-year",
			"6 months",
			180,
			15990,
			"Great value",
			&[
				"48 pickups",
				"Eco-friendly disposal",
				"Priority support",
				"15% discount",
			],
			false,
		),
		plan(
			"1year",
			"Annual",
			"1 year",
			365,
			29990,
			"Maximum savings",
			&[
				"96 pickups",
				"Eco-friendly disposal",
				"VIP support",
				"25% discount",
				"Bonus services",
			],
			false,
		),
	]
}
