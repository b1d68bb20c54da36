//! Ordered set of registered plugins.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use uuid::Uuid;

use crate::{
	services::{plugin::ActionPlugin, registry::error::RegistryError},
	utils::metrics::{forget_registry, record_registered_plugins},
};

/// Registered plugins in registration order.
///
/// Plugins are stored behind an `RwLock` so registration can happen while
/// dispatches are running; each dispatch works on a snapshot. Each registry
/// reports its size under its own `registry` metric label.
pub struct PluginRegistry {
	id: String,
	plugins: RwLock<Vec<Arc<dyn ActionPlugin>>>,
}

impl Default for PluginRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for PluginRegistry {
	fn drop(&mut self) {
		forget_registry(&self.id);
	}
}

impl PluginRegistry {
	pub fn new() -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			plugins: RwLock::new(Vec::new()),
		}
	}

	/// Label of this registry in the `plugins_registered` metric.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Appends a plugin. Fails if a plugin with the same id is registered.
	pub async fn register(&self, plugin: Arc<dyn ActionPlugin>) -> Result<(), RegistryError> {
		let mut plugins = self.plugins.write().await;
		if plugins
			.iter()
			.any(|existing| existing.plugin_id() == plugin.plugin_id())
		{
			return Err(RegistryError::duplicate_plugin_id(
				format!("plugin '{}' is already registered", plugin.plugin_id()),
				None,
				Some(HashMap::from([(
					"plugin_id".to_string(),
					plugin.plugin_id().to_string(),
				)])),
			));
		}

		tracing::info!(
			plugin_id = plugin.plugin_id(),
			actions = ?plugin.supported_actions(),
			"registered plugin"
		);
		plugins.push(plugin);
		record_registered_plugins(&self.id, plugins.len());
		Ok(())
	}

	/// Removes a plugin, returning it if it was registered.
	pub async fn unregister(&self, plugin_id: &str) -> Option<Arc<dyn ActionPlugin>> {
		let mut plugins = self.plugins.write().await;
		let position = plugins.iter().position(|p| p.plugin_id() == plugin_id)?;
		let removed = plugins.remove(position);
		record_registered_plugins(&self.id, plugins.len());
		tracing::info!(plugin_id, "unregistered plugin");
		Some(removed)
	}

	pub async fn get(&self, plugin_id: &str) -> Option<Arc<dyn ActionPlugin>> {
		self.plugins
			.read()
			.await
			.iter()
			.find(|p| p.plugin_id() == plugin_id)
			.cloned()
	}

	/// Current plugins in registration order.
	pub async fn snapshot(&self) -> Vec<Arc<dyn ActionPlugin>> {
		self.plugins.read().await.clone()
	}

	pub async fn plugin_ids(&self) -> Vec<String> {
		self.plugins
			.read()
			.await
			.iter()
			.map(|p| p.plugin_id().to_string())
			.collect()
	}

	pub async fn len(&self) -> usize {
		self.plugins.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.plugins.read().await.is_empty()
	}
}
