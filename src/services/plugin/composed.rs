//! Plugin assembled from one builder per action and a shared chain data source.

use alloy::primitives::Address;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};

use crate::{
	models::{ActionType, ValidatedParams},
	services::plugin::{
		error::PluginError,
		traits::{ActionPlugin, BuildOutcome, ChainDataSource, TransactionFilterBuilder},
	},
};

/// An [`ActionPlugin`] whose declared actions are exactly the actions it has a
/// builder for.
pub struct ComposedPlugin {
	plugin_id: String,
	actions: Vec<ActionType>,
	builders: HashMap<ActionType, Arc<dyn TransactionFilterBuilder>>,
	chain_data: Arc<dyn ChainDataSource>,
}

impl ComposedPlugin {
	pub fn new(plugin_id: impl Into<String>, chain_data: Arc<dyn ChainDataSource>) -> Self {
		Self {
			plugin_id: plugin_id.into(),
			actions: Vec::new(),
			builders: HashMap::new(),
			chain_data,
		}
	}

	/// Registers the builder for `action`, replacing any previous one.
	pub fn with_builder(
		mut self,
		action: ActionType,
		builder: Arc<dyn TransactionFilterBuilder>,
	) -> Self {
		if self.builders.insert(action, builder).is_none() {
			self.actions.push(action);
		}
		self
	}

	fn query_error(&self, what: &str, action: ActionType, error: anyhow::Error) -> PluginError {
		PluginError::capability_query(
			format!("failed to load supported {} for {}", what, action),
			Some(error.into()),
			Some(HashMap::from([
				("plugin_id".to_string(), self.plugin_id.clone()),
				("action".to_string(), action.to_string()),
			])),
		)
	}
}

#[async_trait]
impl ActionPlugin for ComposedPlugin {
	fn plugin_id(&self) -> &str {
		&self.plugin_id
	}

	fn supported_actions(&self) -> &[ActionType] {
		&self.actions
	}

	async fn supported_chain_ids(&self, action: ActionType) -> Result<Vec<u64>, PluginError> {
		if !self.supports(action) {
			return Ok(Vec::new());
		}
		self.chain_data
			.supported_chain_ids(action)
			.await
			.map_err(|e| self.query_error("chains", action, e))
	}

	async fn supported_token_addresses(
		&self,
		chain_id: u64,
		action: ActionType,
	) -> Result<Vec<Address>, PluginError> {
		if !self.supports(action) {
			return Ok(Vec::new());
		}
		self.chain_data
			.supported_token_addresses(chain_id, action)
			.await
			.map_err(|e| self.query_error("tokens", action, e))
	}

	async fn build_filter(&self, params: &ValidatedParams) -> Result<BuildOutcome, PluginError> {
		match self.builders.get(&params.action()) {
			Some(builder) => builder.build(params).await,
			None => Ok(BuildOutcome::NotSupported),
		}
	}
}
