//! Plugin capability cache.
//!
//! Remembers which chains each plugin supports per action, and which tokens per
//! action and chain, so that repeated dispatches do not repeat capability queries.
//! Concurrent lookups of the same key share a single query and its outcome,
//! whether it succeeds or fails.

mod cache;

pub use cache::CoalescingCache;

use alloy::primitives::Address;
use std::{collections::BTreeSet, collections::HashMap, future::Future, sync::Arc, time::Duration};

use crate::{
	models::ActionType,
	services::plugin::{ActionPlugin, PluginError},
};

/// Key of a supported chain set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainCapabilityKey {
	pub plugin_id: String,
	pub action: ActionType,
}

/// Key of a supported token set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenCapabilityKey {
	pub plugin_id: String,
	pub action: ActionType,
	pub chain_id: u64,
}

pub struct CapabilityCache {
	chains: CoalescingCache<ChainCapabilityKey, BTreeSet<u64>, PluginError>,
	tokens: CoalescingCache<TokenCapabilityKey, BTreeSet<Address>, PluginError>,
	query_timeout: Duration,
}

impl CapabilityCache {
	/// Creates an empty cache whose underlying queries are bounded by `query_timeout`.
	pub fn new(query_timeout: Duration) -> Self {
		Self {
			chains: CoalescingCache::new("supported_chains"),
			tokens: CoalescingCache::new("supported_tokens"),
			query_timeout,
		}
	}

	/// Chains on which `plugin` supports `action`.
	pub async fn supported_chain_ids(
		&self,
		plugin: &dyn ActionPlugin,
		action: ActionType,
	) -> Result<Arc<BTreeSet<u64>>, PluginError> {
		let key = ChainCapabilityKey {
			plugin_id: plugin.plugin_id().to_string(),
			action,
		};
		self.chains
			.get_or_fetch(key, || async {
				let chains = self
					.bounded(plugin, "chains", plugin.supported_chain_ids(action))
					.await?;
				Ok(chains.into_iter().collect())
			})
			.await
			.map_err(PluginError::from_shared)
	}

	/// Tokens `plugin` accepts for `action` on `chain_id`. Empty means unrestricted.
	pub async fn supported_token_addresses(
		&self,
		plugin: &dyn ActionPlugin,
		chain_id: u64,
		action: ActionType,
	) -> Result<Arc<BTreeSet<Address>>, PluginError> {
		let key = TokenCapabilityKey {
			plugin_id: plugin.plugin_id().to_string(),
			action,
			chain_id,
		};
		self.tokens
			.get_or_fetch(key, || async {
				let tokens = self
					.bounded(
						plugin,
						"tokens",
						plugin.supported_token_addresses(chain_id, action),
					)
					.await?;
				Ok(tokens.into_iter().collect())
			})
			.await
			.map_err(PluginError::from_shared)
	}

	/// Drops every entry of one plugin.
	pub async fn invalidate_plugin(&self, plugin_id: &str) {
		self.chains
			.invalidate_where(|key| key.plugin_id == plugin_id)
			.await;
		self.tokens
			.invalidate_where(|key| key.plugin_id == plugin_id)
			.await;
		tracing::debug!(plugin_id, "invalidated plugin capabilities");
	}

	pub async fn clear(&self) {
		self.chains.clear().await;
		self.tokens.clear().await;
		tracing::debug!("cleared capability cache");
	}

	async fn bounded<T>(
		&self,
		plugin: &dyn ActionPlugin,
		what: &str,
		query: impl Future<Output = Result<T, PluginError>>,
	) -> Result<T, PluginError> {
		match tokio::time::timeout(self.query_timeout, query).await {
			Ok(result) => result,
			Err(elapsed) => Err(PluginError::timeout(
				format!(
					"supported {} query exceeded {}ms",
					what,
					self.query_timeout.as_millis()
				),
				Some(Box::new(elapsed)),
				Some(HashMap::from([(
					"plugin_id".to_string(),
					plugin.plugin_id().to_string(),
				)])),
			)),
		}
	}
}
