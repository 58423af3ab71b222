//! Loader for configurations split across several files.
//!
//! Any file may pull in others with `include`, which takes a path or a list
//! of paths relative to the directory of the main file. Includes nest. A file
//! that includes itself through a chain is an include cycle; a file reached
//! twice along separate chains is rejected too, as is a top-level section
//! defined in more than one file.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Loads a configuration file together with everything it includes.
pub struct ConfigLoader {
	/// Directory relative includes are resolved against
	base_path: PathBuf,
	/// Canonical paths of files read so far
	visited: HashSet<PathBuf>,
	/// Files whose includes are being loaded, outermost first
	stack: Vec<PathBuf>,
	/// File that defined each top-level section
	origins: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			visited: HashSet::new(),
			stack: Vec::new(),
			origins: HashMap::new(),
		}
	}

	/// Loads `config_path` and its includes into one validated [`Config`].
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let root = self.resolve_path(config_path)?;
		let merged = self.load_tree(root).await?;

		tracing::debug!(
			files = self.visited.len(),
			sections = self.origins.len(),
			"Merged configuration files"
		);
		Config::from_value(toml::Value::Table(merged))
	}

	/// Reads `path`, then folds in its includes depth-first.
	async fn load_tree(&mut self, path: PathBuf) -> Result<toml::Table, ConfigError> {
		let (canonical, content) = self.read(&path).await?;
		let mut table: toml::Table = toml::from_str(&content)?;

		let includes = match table.remove("include") {
			Some(value) => include_paths(&value)?,
			None => Vec::new(),
		};

		for section in table.keys() {
			self.claim(section, &path)?;
		}

		self.stack.push(canonical);
		for include in includes {
			let include_path = self.resolve_path(&include)?;
			let included = Box::pin(self.load_tree(include_path)).await?;
			table.extend(included);
		}
		self.stack.pop();

		Ok(table)
	}

	/// Reads a file once and resolves environment variables in it.
	async fn read(&mut self, path: &Path) -> Result<(PathBuf, String), ConfigError> {
		let canonical = path.canonicalize().map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;
		if self.stack.contains(&canonical) {
			return Err(ConfigError::Validation(format!(
				"Include cycle: {} includes itself",
				canonical.display()
			)));
		}
		if !self.visited.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"{} is included more than once",
				canonical.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		Ok((canonical, resolve_env_vars(&content)?))
	}

	/// Records that `section` comes from `file`.
	fn claim(&mut self, section: &str, file: &Path) -> Result<(), ConfigError> {
		if let Some(previous) = self.origins.get(section) {
			return Err(ConfigError::Validation(format!(
				"Section '{}' is defined in both {} and {}",
				section,
				previous.display(),
				file.display()
			)));
		}
		self.origins.insert(section.to_string(), file.to_path_buf());
		Ok(())
	}

	/// Resolves a path against the base directory and checks it exists.
	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let resolved = self.base_path.join(path.as_ref());
		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}
		Ok(resolved)
	}
}

/// Parses an `include` value: one path or an array of paths.
fn include_paths(value: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match value {
		toml::Value::String(path) => Ok(vec![PathBuf::from(path)]),
		toml::Value::Array(items) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		_ => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	fn write(dir: &TempDir, name: &str, content: &str) {
		fs::write(dir.path().join(name), content).unwrap();
	}

	#[tokio::test]
	async fn test_single_file_config() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"config.toml",
			r#"
[client]
id = "pickup-test"

[api]
primary = "memory"
[api.implementations.memory]

[view]
mode = "customer"
user_id = 1
"#,
		);

		let mut loader = ConfigLoader::new(dir.path());
		let config = loader.load_config("config.toml").await.unwrap();

		assert_eq!(config.client.id, "pickup-test");
		assert_eq!(config.view.user_id, Some(1));
	}

	#[tokio::test]
	async fn test_config_with_includes() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"main.toml",
			r#"
include = ["api.toml", "plans.toml"]

[client]
id = "pickup-test"

[view]
mode = "admin"
"#,
		);
		write(
			&dir,
			"api.toml",
			r#"
[api]
primary = "http"
[api.implementations.http]
endpoint = "http://127.0.0.1:8080/orders"
"#,
		);
		write(
			&dir,
			"plans.toml",
			r#"
[[plans]]
id = "weekly"
name = "Weekly"
duration = "1 week"
duration_days = 7
price = 790
"#,
		);

		let mut loader = ConfigLoader::new(dir.path());
		let config = loader.load_config("main.toml").await.unwrap();

		assert_eq!(config.api.primary, "http");
		assert_eq!(config.plans.len(), 1);
		assert_eq!(config.plans[0].id, "weekly");
	}

	#[tokio::test]
	async fn test_nested_includes() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"main.toml",
			"include = \"api.toml\"\n[client]\nid = \"pickup-test\"\n",
		);
		write(
			&dir,
			"api.toml",
			"include = \"view.toml\"\n[api]\nprimary = \"memory\"\n[api.implementations.memory]\n",
		);
		write(&dir, "view.toml", "[view]\nmode = \"customer\"\nuser_id = 4\n");

		let mut loader = ConfigLoader::new(dir.path());
		let config = loader.load_config("main.toml").await.unwrap();

		assert_eq!(config.view.user_id, Some(4));
		assert_eq!(config.api.primary, "memory");
	}

	#[tokio::test]
	async fn test_duplicate_section_error() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"main.toml",
			"include = \"duplicate.toml\"\n[client]\nid = \"pickup-test\"\n",
		);
		write(&dir, "duplicate.toml", "[client]\nid = \"another-client\"\n");

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();

		assert!(err.to_string().contains("Section 'client'"));
	}

	#[tokio::test]
	async fn test_include_cycle_detection() {
		let dir = TempDir::new().unwrap();
		write(&dir, "a.toml", "include = \"b.toml\"\n[client]\nid = \"pickup-test\"\n");
		write(&dir, "b.toml", "include = \"a.toml\"\n[view]\nmode = \"admin\"\n");

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("a.toml").await.unwrap_err();

		assert!(err.to_string().contains("Include cycle"));
	}

	#[tokio::test]
	async fn test_self_include_detection() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"self.toml",
			"include = [\"self.toml\"]\n[client]\nid = \"pickup-test\"\n",
		);

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("self.toml").await.unwrap_err();

		assert!(err.to_string().contains("Include cycle"));
	}

	#[tokio::test]
	async fn test_shared_include_is_not_a_cycle() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"main.toml",
			"include = [\"api.toml\", \"view.toml\"]\n[client]\nid = \"pickup-test\"\n",
		);
		write(&dir, "api.toml", "include = \"plans.toml\"\n[api]\nprimary = \"memory\"\n");
		write(&dir, "view.toml", "include = \"plans.toml\"\n[view]\nmode = \"admin\"\n");
		write(&dir, "plans.toml", "plans = []\n");

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();

		let message = err.to_string();
		assert!(message.contains("plans.toml is included more than once"));
		assert!(!message.contains("cycle"));
	}

	#[tokio::test]
	async fn test_missing_include_reported() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"main.toml",
			"include = [\"nowhere.toml\"]\n[client]\nid = \"x\"\n",
		);

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();

		assert!(matches!(err, ConfigError::Io(_)));
		assert!(err.to_string().contains("nowhere.toml"));
	}

	#[tokio::test]
	async fn test_include_must_be_paths() {
		let dir = TempDir::new().unwrap();
		write(&dir, "main.toml", "include = 3\n[client]\nid = \"x\"\n");

		let mut loader = ConfigLoader::new(dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();

		assert!(err.to_string().contains("string or array"));
	}
}
