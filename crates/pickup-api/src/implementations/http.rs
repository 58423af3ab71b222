//! HTTP backend for the orders API.
//!
//! Talks to the single remote orders endpoint: `GET` lists, `POST` creates
//! and `PUT` updates status. Success is decided by the HTTP status alone;
//! error bodies of the form `{ "error": "..." }` are carried into the error.

use crate::{ApiError, ApiFactory, ApiRegistry, OrdersApiInterface};
use async_trait::async_trait;
use pickup_types::{
	ConfigSchema, CreateOrderResponse, ErrorResponse, Field, FieldType, ImplementationRegistry,
	NewOrder, Order, OrderId, OrderScope, OrderStatus, OrdersResponse, PlanCatalog, Schema,
	SchemaError, UpdateStatusRequest,
};
use serde::Deserialize;
use std::time::Duration;

/// Configuration table for the HTTP backend.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpApiConfig {
	/// Full URL of the orders endpoint.
	pub endpoint: String,
	/// Optional per-request timeout. No timeout is applied when absent.
	#[serde(default)]
	pub timeout_seconds: Option<u64>,
}

/// Orders API backed by the remote HTTP endpoint.
pub struct HttpOrdersApi {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpOrdersApi {
	/// Creates a client for `endpoint`.
	pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
		let mut builder = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(4);
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|e| ApiError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			endpoint: endpoint.into(),
		})
	}

	/// The endpoint this client talks to.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Passes success responses through and turns anything else into
	/// [`ApiError::Status`].
	async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		let message = match serde_json::from_str::<ErrorResponse>(&body) {
			Ok(error) => error.error,
			Err(_) if !body.trim().is_empty() => body.trim().to_string(),
			Err(_) => status
				.canonical_reason()
				.unwrap_or("unexpected status")
				.to_string(),
		};

		Err(ApiError::Status {
			status: status.as_u16(),
			message,
		})
	}
}

fn network_error(error: reqwest::Error) -> ApiError {
	ApiError::Network(error.to_string())
}

#[async_trait]
impl OrdersApiInterface for HttpOrdersApi {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpApiSchema)
	}

	async fn list_orders(&self, scope: &OrderScope) -> Result<Vec<Order>, ApiError> {
		let response = self
			.client
			.get(&self.endpoint)
			.query(&scope.query_pairs())
			.send()
			.await
			.map_err(network_error)?;
		let response = Self::ensure_success(response).await?;

		let body: OrdersResponse = response
			.json()
			.await
			.map_err(|e| ApiError::Malformed(e.to_string()))?;

		body.orders
			.ok_or_else(|| ApiError::Malformed("response has no 'orders' field".to_string()))
	}

	async fn create_order(&self, order: &NewOrder) -> Result<CreateOrderResponse, ApiError> {
		let response = self
			.client
			.post(&self.endpoint)
			.json(order)
			.send()
			.await
			.map_err(network_error)?;
		let response = Self::ensure_success(response).await?;

		// Success is decided by the status; the body is informational
		let body = response.text().await.unwrap_or_default();
		match serde_json::from_str::<CreateOrderResponse>(&body) {
			Ok(created) => Ok(created),
			Err(e) => {
				tracing::debug!(error = %e, "Ignoring unparsable creation response body");
				Ok(CreateOrderResponse {
					success: true,
					..CreateOrderResponse::default()
				})
			},
		}
	}

	async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<(), ApiError> {
		let response = self
			.client
			.put(&self.endpoint)
			.json(&UpdateStatusRequest { order_id, status })
			.send()
			.await
			.map_err(network_error)?;
		Self::ensure_success(response).await?;
		Ok(())
	}
}

/// Configuration schema for HttpOrdersApi.
pub struct HttpApiSchema;

impl ConfigSchema for HttpApiSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		let schema = Schema::new(
			vec![
				Field::new("endpoint", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
							Ok(())
						},
						_ => Err("endpoint must start with http:// or https://".to_string()),
					}
				}),
			],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(3600),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Factory function to create the HTTP backend from configuration.
///
/// Configuration parameters:
/// - `endpoint`: URL of the orders endpoint (required)
/// - `timeout_seconds`: request timeout (optional, none by default)
pub fn create_api(
	config: &toml::Value,
	_catalog: &PlanCatalog,
) -> Result<Box<dyn OrdersApiInterface>, ApiError> {
	HttpApiSchema
		.validate(config)
		.map_err(|e| ApiError::Configuration(format!("Invalid http config: {}", e)))?;

	let http_config: HttpApiConfig = config
		.clone()
		.try_into()
		.map_err(|e| ApiError::Configuration(format!("Invalid http config: {}", e)))?;

	let api = HttpOrdersApi::new(
		http_config.endpoint,
		http_config.timeout_seconds.map(Duration::from_secs),
	)?;
	tracing::debug!(endpoint = %api.endpoint(), "Configured HTTP orders API");
	Ok(Box::new(api))
}

/// Registry for the HTTP backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = ApiFactory;

	fn factory() -> Self::Factory {
		create_api
	}
}

impl ApiRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(source: &str) -> toml::Value {
		toml::from_str(source).unwrap()
	}

	#[test]
	fn test_create_from_config() {
		let config = table("endpoint = \"http://127.0.0.1:8080/orders\"\ntimeout_seconds = 5");
		assert!(create_api(&config, &PlanCatalog::builtin()).is_ok());
	}

	#[test]
	fn test_rejects_non_http_endpoint() {
		let config = table("endpoint = \"127.0.0.1:8080\"");
		let err = create_api(&config, &PlanCatalog::builtin()).err().unwrap();
		assert!(matches!(err, ApiError::Configuration(_)));
		assert!(err.to_string().contains("http://"));
	}

	#[test]
	fn test_rejects_missing_endpoint() {
		let config = table("timeout_seconds = 5");
		let err = create_api(&config, &PlanCatalog::builtin()).err().unwrap();
		assert!(err.to_string().contains("endpoint"));
	}
}
