//! Contracts between the dispatcher, action plugins and their external collaborators.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::{
	models::{ActionType, TransactionFilter, ValidatedParams},
	services::plugin::error::PluginError,
};

/// Result of asking a builder for a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
	Implemented(TransactionFilter),
	/// The plugin does not implement the action. Not an error.
	NotSupported,
}

impl BuildOutcome {
	pub fn into_filter(self) -> Option<TransactionFilter> {
		match self {
			Self::Implemented(filter) => Some(filter),
			Self::NotSupported => None,
		}
	}
}

/// Turns validated parameters of one action into a transaction filter.
///
/// Implementations must not read process-global state. Unconstrained fields map
/// to [`FieldPredicate::Any`](crate::models::FieldPredicate::Any).
#[async_trait]
pub trait TransactionFilterBuilder: Send + Sync {
	async fn build(&self, params: &ValidatedParams) -> Result<BuildOutcome, PluginError>;
}

/// An independently developed module mapping actions to transaction filters.
#[async_trait]
pub trait ActionPlugin: Send + Sync {
	/// Identifier, unique within a registry
	fn plugin_id(&self) -> &str;

	/// Actions this plugin has a builder for
	fn supported_actions(&self) -> &[ActionType];

	fn supports(&self, action: ActionType) -> bool {
		self.supported_actions().contains(&action)
	}

	/// Chains on which the plugin recognizes `action`
	async fn supported_chain_ids(&self, action: ActionType) -> Result<Vec<u64>, PluginError>;

	/// Tokens the plugin recognizes for `action` on `chain_id`. An empty list
	/// means no token restriction.
	async fn supported_token_addresses(
		&self,
		chain_id: u64,
		action: ActionType,
	) -> Result<Vec<Address>, PluginError>;

	/// Builds the filter for already validated parameters
	async fn build_filter(&self, params: &ValidatedParams) -> Result<BuildOutcome, PluginError>;
}

/// Source of per-chain capability knowledge, typically a chain registry or token list.
#[async_trait]
pub trait ChainDataSource: Send + Sync {
	async fn supported_chain_ids(&self, action: ActionType) -> Result<Vec<u64>, anyhow::Error>;

	async fn supported_token_addresses(
		&self,
		chain_id: u64,
		action: ActionType,
	) -> Result<Vec<Address>, anyhow::Error>;
}

/// Read-only source of deployed contract metadata.
#[async_trait]
pub trait ContractMetadataSource: Send + Sync {
	/// Contracts implementing `action` on `chain_id`; empty when none are deployed.
	async fn contract_addresses(
		&self,
		chain_id: u64,
		action: ActionType,
	) -> Result<Vec<Address>, anyhow::Error>;

	/// Signature override for `action` on `chain_id`, when a deployment differs
	/// from the canonical interface.
	async fn signature(
		&self,
		_chain_id: u64,
		_action: ActionType,
	) -> Result<Option<String>, anyhow::Error> {
		Ok(None)
	}
}
