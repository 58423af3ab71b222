//! Builder for wiring an [`OrderController`] from configuration.
//!
//! Every configured orders API implementation that has a registered factory
//! is constructed (which validates its table); the primary one backs the
//! controller.

use crate::engine::OrderController;
use pickup_api::{ApiError, OrdersApiInterface, OrdersApiService};
use pickup_config::Config;
use pickup_types::PlanCatalog;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a controller.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Builds an [`OrderController`] with a pluggable orders API.
pub struct ControllerBuilder {
	config: Config,
}

impl ControllerBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the controller using `factories`, keyed by implementation name.
	pub fn build<F>(self, factories: &HashMap<String, F>) -> Result<OrderController, BuilderError>
	where
		F: Fn(&toml::Value, &PlanCatalog) -> Result<Box<dyn OrdersApiInterface>, ApiError>,
	{
		let catalog = self
			.config
			.catalog()
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		let mut api_impls = HashMap::new();
		for (name, config) in &self.config.api.implementations {
			let Some(factory) = factories.get(name) else {
				tracing::warn!(component = "api", implementation = %name, "No factory registered, skipping");
				continue;
			};
			match factory(config, &catalog) {
				Ok(implementation) => {
					let is_primary = &self.config.api.primary == name;
					tracing::info!(component = "api", implementation = %name, enabled = %is_primary, "Loaded");
					api_impls.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "api",
						implementation = %name,
						error = %e,
						"Failed to create API implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create API implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		let primary = &self.config.api.primary;
		let backend = api_impls.remove(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"orders API '{}' has no registered implementation",
				primary
			))
		})?;

		let scope = self.config.scope();
		tracing::info!(
			component = "controller",
			client = %self.config.client.id,
			scope = %scope,
			plans = catalog.len(),
			"Controller ready"
		);

		Ok(OrderController::new(
			OrdersApiService::new(backend),
			Arc::new(catalog),
			scope,
		))
	}
}
