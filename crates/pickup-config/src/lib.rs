//! Configuration module for the pickup ordering client.
//!
//! Configuration is loaded from TOML files and validated before use.
//! `${VAR}` and `${VAR:-default}` references are resolved from the
//! environment before parsing.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["api.toml", "plans.toml"]` to include other config files
//! - Included files may include further files; each file is read at most once
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use pickup_types::{builtin_plans, OrderScope, PlanCatalog, SubscriptionPlan, UserId};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// A file could not be found or read.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// The TOML is syntactically wrong or has the wrong shape.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// The configuration parsed but is not usable.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default rendering echoes the whole input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this client instance.
	pub client: ClientConfig,
	/// Orders API implementations.
	pub api: ApiConfig,
	/// Which orders the client shows by default.
	#[serde(default)]
	pub view: ViewConfig,
	/// Subscription plan catalog. Falls back to the built-in plans.
	#[serde(default = "builtin_plans")]
	pub plans: Vec<SubscriptionPlan>,
}

/// Identity of this client instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Name used in logs.
	pub id: String,
}

/// Configuration for the orders API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of implementation names to their raw configuration tables.
	pub implementations: HashMap<String, toml::Value>,
}

/// Default listing scope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ViewConfig {
	#[serde(default)]
	pub mode: ViewMode,
	/// Customer whose orders are listed in customer mode.
	pub user_id: Option<UserId>,
}

/// Customer or administrative view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	#[default]
	Customer,
	Admin,
}

/// Substitutes `${NAME}` and `${NAME:-fallback}` references with values from
/// the environment. A reference without fallback to an unset variable is an
/// error. Inputs above 1MB are refused.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration is {} bytes, the limit is {} bytes",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Invalid variable pattern: {}", e)))?;

	let mut missing: Option<String> = None;
	let resolved = pattern.replace_all(input, |caps: &Captures<'_>| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(fallback)) => fallback.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Default listing scope derived from the view section.
	pub fn scope(&self) -> OrderScope {
		match (self.view.mode, self.view.user_id) {
			(ViewMode::Customer, Some(user_id)) => OrderScope::customer(user_id),
			// Unreachable after validation; customer mode requires a user id
			_ => OrderScope::Admin,
		}
	}

	/// Builds the immutable plan catalog.
	pub fn catalog(&self) -> Result<PlanCatalog, ConfigError> {
		PlanCatalog::new(self.plans.clone()).map_err(|e| ConfigError::Validation(e.to_string()))
	}

	/// Deserializes an already env-resolved document and validates it.
	pub(crate) fn from_value(value: toml::Value) -> Result<Self, ConfigError> {
		let config: Config = value.try_into()?;
		config.validate()?;
		tracing::debug!(client = %config.client.id, plans = config.plans.len(), "Parsed configuration");
		Ok(config)
	}

	/// Validates that every section is usable:
	/// - client id is not empty
	/// - at least one API implementation exists and the primary is one of them
	/// - customer view names a user
	/// - the plan catalog is well formed
	fn validate(&self) -> Result<(), ConfigError> {
		if self.client.id.trim().is_empty() {
			return Err(ConfigError::Validation("Client ID cannot be empty".into()));
		}

		if self.api.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one API implementation must be configured".into(),
			));
		}
		if self.api.primary.is_empty() {
			return Err(ConfigError::Validation(
				"API primary implementation cannot be empty".into(),
			));
		}
		if !self.api.implementations.contains_key(&self.api.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary API implementation '{}' not found in implementations",
				self.api.primary
			)));
		}

		if self.view.mode == ViewMode::Customer && self.view.user_id.is_none() {
			return Err(ConfigError::Validation(
				"Customer view requires view.user_id".into(),
			));
		}

		self.catalog()?;

		Ok(())
	}

	/// Minimal configuration backed by the in-process API.
	#[cfg(any(test, feature = "testing"))]
	pub fn in_memory(id: &str) -> Self {
		let mut implementations = HashMap::new();
		implementations.insert(
			"memory".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);
		Self {
			client: ClientConfig { id: id.to_string() },
			api: ApiConfig {
				primary: "memory".to_string(),
				implementations,
			},
			view: ViewConfig {
				mode: ViewMode::Admin,
				user_id: None,
			},
			plans: builtin_plans(),
		}
	}
}

/// Parses a TOML string: environment variables are resolved first and the
/// result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let table: toml::Table = toml::from_str(&resolved)?;
		Config::from_value(toml::Value::Table(table))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[client]
id = "pickup-test"

[api]
primary = "http"
[api.implementations.http]
endpoint = "http://localhost:8080/orders"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("PICKUP_TEST_HOST", "localhost");
		std::env::set_var("PICKUP_TEST_PORT", "8080");

		let input = "endpoint = \"http://${PICKUP_TEST_HOST}:${PICKUP_TEST_PORT}/orders\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "endpoint = \"http://localhost:8080/orders\"");

		std::env::remove_var("PICKUP_TEST_HOST");
		std::env::remove_var("PICKUP_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${PICKUP_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${PICKUP_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.unwrap_err().to_string().contains("PICKUP_MISSING_VAR"));
	}

	#[test]
	fn test_defaults_to_builtin_catalog() {
		let config = Config::from_str(&format!("{}\n[view]\nuser_id = 1\n", BASE)).unwrap();
		assert_eq!(config.plans.len(), 4);
		assert_eq!(config.catalog().unwrap().len(), 4);
		assert_eq!(config.scope(), OrderScope::customer(1));
	}

	#[test]
	fn test_admin_view() {
		let config = Config::from_str(&format!("{}\n[view]\nmode = \"admin\"\n", BASE)).unwrap();
		assert_eq!(config.view.mode, ViewMode::Admin);
		assert_eq!(config.scope(), OrderScope::Admin);
	}

	#[test]
	fn test_customer_view_requires_user() {
		let err = Config::from_str(BASE).unwrap_err();
		assert!(err.to_string().contains("view.user_id"));
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let config_str = r#"
[client]
id = "pickup-test"

[api]
primary = "grpc"
[api.implementations.http]
endpoint = "http://localhost"

[view]
mode = "admin"
"#;
		let err = Config::from_str(config_str).unwrap_err();
		assert!(err.to_string().contains("'grpc' not found"));
	}

	#[test]
	fn test_custom_plans() {
		let config_str = format!(
			r#"{}
[view]
mode = "admin"

[[plans]]
id = "weekly"
name = "Weekly"
duration = "1 week"
duration_days = 7
price = 790
features = ["2 pickups"]
"#,
			BASE
		);
		let config = Config::from_str(&config_str).unwrap();
		let catalog = config.catalog().unwrap();
		assert_eq!(catalog.len(), 1);
		assert!(!catalog.get("weekly").unwrap().popular);
	}

	#[test]
	fn test_duplicate_plans_rejected() {
		let plan = r#"
[[plans]]
id = "weekly"
name = "Weekly"
duration = "1 week"
duration_days = 7
price = 790
"#;
		let config_str = format!("{}\n[view]\nmode = \"admin\"\n{}{}", BASE, plan, plan);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("Duplicate plan id 'weekly'"));
	}

	#[tokio::test]
	async fn test_shipped_demo_config_loads() {
		let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/demo.toml");
		let config = Config::from_file(path).await.unwrap();

		assert_eq!(config.api.primary, "memory");
		assert_eq!(config.scope(), OrderScope::Admin);
		assert_eq!(config.catalog().unwrap(), PlanCatalog::builtin());
	}

	#[test]
	fn test_in_memory_config_is_valid() {
		let config = Config::in_memory("unit");
		assert!(config.validate().is_ok());
		assert_eq!(config.scope(), OrderScope::Admin);
	}
}
