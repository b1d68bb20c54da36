//! Dispatcher configuration loading and validation.
//!
//! Settings come from a JSON file or from the process environment:
//!
//! ```json
//! { "plugin_timeout_ms": 5000, "capability_timeout_ms": 3000, "max_concurrency": 16 }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path, time::Duration};

use crate::models::config::{ConfigError, ConfigLoader};

pub const ENV_PLUGIN_TIMEOUT_MS: &str = "DISPATCH_PLUGIN_TIMEOUT_MS";
pub const ENV_CAPABILITY_TIMEOUT_MS: &str = "DISPATCH_CAPABILITY_TIMEOUT_MS";
pub const ENV_MAX_CONCURRENCY: &str = "DISPATCH_MAX_CONCURRENCY";

const DEFAULT_PLUGIN_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CAPABILITY_TIMEOUT_MS: u64 = 5_000;

/// Runtime settings of a [`Dispatcher`](crate::services::registry::Dispatcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
	/// Upper bound on a single builder invocation
	#[serde(default = "default_plugin_timeout_ms")]
	pub plugin_timeout_ms: u64,

	/// Upper bound on a single capability query
	#[serde(default = "default_capability_timeout_ms")]
	pub capability_timeout_ms: u64,

	/// Maximum number of plugins invoked at once; unbounded when unset
	#[serde(default)]
	pub max_concurrency: Option<usize>,
}

fn default_plugin_timeout_ms() -> u64 {
	DEFAULT_PLUGIN_TIMEOUT_MS
}

fn default_capability_timeout_ms() -> u64 {
	DEFAULT_CAPABILITY_TIMEOUT_MS
}

impl Default for DispatcherConfig {
	fn default() -> Self {
		Self {
			plugin_timeout_ms: DEFAULT_PLUGIN_TIMEOUT_MS,
			capability_timeout_ms: DEFAULT_CAPABILITY_TIMEOUT_MS,
			max_concurrency: None,
		}
	}
}

impl DispatcherConfig {
	pub fn plugin_timeout(&self) -> Duration {
		Duration::from_millis(self.plugin_timeout_ms)
	}

	pub fn capability_timeout(&self) -> Duration {
		Duration::from_millis(self.capability_timeout_ms)
	}

	/// Builds a configuration from defaults overridden by `DISPATCH_*` variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self::default();

		if let Some(value) = parse_var::<u64>(&lookup, ENV_PLUGIN_TIMEOUT_MS)? {
			config.plugin_timeout_ms = value;
		}
		if let Some(value) = parse_var::<u64>(&lookup, ENV_CAPABILITY_TIMEOUT_MS)? {
			config.capability_timeout_ms = value;
		}
		if let Some(value) = parse_var::<usize>(&lookup, ENV_MAX_CONCURRENCY)? {
			config.max_concurrency = Some(value);
		}

		config.validate()?;
		Ok(config)
	}
}

fn parse_var<T>(
	lookup: &impl Fn(&str) -> Option<String>,
	key: &str,
) -> Result<Option<T>, ConfigError>
where
	T: std::str::FromStr,
	T::Err: std::error::Error + Send + Sync + 'static,
{
	match lookup(key) {
		None => Ok(None),
		Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse environment variable {}: {}", key, e),
				Some(Box::new(e)),
				Some(HashMap::from([
					("variable".to_string(), key.to_string()),
					("value".to_string(), raw.clone()),
				])),
			)
		}),
	}
}

#[async_trait]
impl ConfigLoader for DispatcherConfig {
	/// Load a dispatcher configuration from a specific file
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(
				"dispatcher config must be a JSON file",
				None,
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			));
		}

		let file = std::fs::File::open(path).map_err(|e| {
			ConfigError::file_error(
				format!("failed to open dispatcher config file: {}", e),
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			)
		})?;
		let config: DispatcherConfig = serde_json::from_reader(file).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse dispatcher config: {}", e),
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			)
		})?;

		config.validate()?;

		Ok(config)
	}

	/// Validate the dispatcher configuration
	///
	/// Ensures that both timeouts are positive and that a concurrency limit,
	/// when present, admits at least one plugin.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.plugin_timeout_ms == 0 {
			return Err(ConfigError::validation_error(
				"plugin_timeout_ms must be greater than 0",
				None,
				None,
			));
		}

		if self.capability_timeout_ms == 0 {
			return Err(ConfigError::validation_error(
				"capability_timeout_ms must be greater than 0",
				None,
				None,
			));
		}

		if self.max_concurrency == Some(0) {
			return Err(ConfigError::validation_error(
				"max_concurrency must be at least 1 when set",
				None,
				None,
			));
		}

		Ok(())
	}
}
