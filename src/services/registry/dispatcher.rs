//! Dispatcher: validates action requests, selects candidate plugins and
//! aggregates their filters.
//!
//! A dispatch runs in five steps:
//! 1. validate the parameters, failing before any plugin is touched
//! 2. snapshot the registered plugins and keep those that declare the action
//! 3. per candidate, consult the capability cache for chain and token support,
//!    then invoke the builder under the per-plugin timeout
//! 4. wait for every candidate
//! 5. collect filters and failures in registration order

use alloy::primitives::Address;
use futures::{future::join_all, stream, StreamExt};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::watch;
use tracing::instrument;

use crate::{
	models::{
		ActionParams, ActionType, ConfigError, ConfigLoader, DispatcherConfig, TransactionFilter,
		ValidatedParams,
	},
	services::{
		capability::CapabilityCache,
		plugin::{ActionPlugin, BuildOutcome, PluginError},
		registry::{
			error::{DispatchError, RegistryError},
			plugins::PluginRegistry,
		},
		schema::{schema_for, validate_params},
	},
	utils::{
		logging::error::TraceableError,
		metrics::{record_dispatch, record_plugin_failure, record_validation_error},
	},
};

/// A filter contributed by one plugin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PluginFilter {
	pub plugin_id: String,
	pub chain_id: u64,
	pub filter: TransactionFilter,
}

/// A plugin that errored, timed out or could not report its capabilities
#[derive(Debug)]
pub struct PluginFailure {
	pub plugin_id: String,
	pub cause: PluginError,
}

/// Aggregate of one dispatch, both lists in plugin registration order
#[derive(Debug, Default)]
pub struct DispatchOutcome {
	pub results: Vec<PluginFilter>,
	pub failures: Vec<PluginFailure>,
}

impl DispatchOutcome {
	pub fn filters(&self) -> impl Iterator<Item = &TransactionFilter> {
		self.results.iter().map(|r| &r.filter)
	}

	pub fn plugin_ids(&self) -> Vec<&str> {
		self.results.iter().map(|r| r.plugin_id.as_str()).collect()
	}

	pub fn failed_plugin_ids(&self) -> Vec<&str> {
		self.failures.iter().map(|f| f.plugin_id.as_str()).collect()
	}
}

/// What happened to a single candidate plugin
enum Evaluation {
	/// Chain or token not supported according to the capability cache
	Skipped,
	NotSupported,
	Filter(TransactionFilter),
	Failed(PluginError),
}

/// Owns the plugin registry and the capability cache.
pub struct Dispatcher {
	registry: PluginRegistry,
	capabilities: CapabilityCache,
	config: DispatcherConfig,
}

impl Default for Dispatcher {
	fn default() -> Self {
		Self::with_checked_config(DispatcherConfig::default())
	}
}

impl Dispatcher {
	/// Creates a dispatcher with an empty registry.
	///
	/// Fails when `config` does not validate: zero timeouts or a concurrency
	/// limit of zero.
	pub fn new(config: DispatcherConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self::with_checked_config(config))
	}

	fn with_checked_config(config: DispatcherConfig) -> Self {
		Self {
			registry: PluginRegistry::new(),
			capabilities: CapabilityCache::new(config.capability_timeout()),
			config,
		}
	}

	pub fn config(&self) -> &DispatcherConfig {
		&self.config
	}

	/// `registry` label under which this dispatcher's plugin count is reported.
	pub fn registry_id(&self) -> &str {
		self.registry.id()
	}

	pub async fn register_plugin(&self, plugin: Arc<dyn ActionPlugin>) -> Result<(), RegistryError> {
		self.registry.register(plugin).await
	}

	/// Removes a plugin and its cached capabilities. Unknown ids are ignored.
	pub async fn unregister_plugin(&self, plugin_id: &str) {
		if self.registry.unregister(plugin_id).await.is_some() {
			self.capabilities.invalidate_plugin(plugin_id).await;
		}
	}

	/// Ids of the registered plugins in registration order.
	pub async fn plugin_ids(&self) -> Vec<String> {
		self.registry.plugin_ids().await
	}

	/// Drops cached capabilities of one plugin, or of every plugin when `None`.
	pub async fn invalidate_capabilities(&self, plugin_id: Option<&str>) {
		match plugin_id {
			Some(plugin_id) => self.capabilities.invalidate_plugin(plugin_id).await,
			None => self.capabilities.clear().await,
		}
	}

	/// Chains on which a registered plugin supports `action`, in ascending order.
	pub async fn get_supported_chain_ids(
		&self,
		plugin_id: &str,
		action: ActionType,
	) -> Result<Vec<u64>, DispatchError> {
		let plugin = self.plugin(plugin_id).await?;
		let chains = self
			.capabilities
			.supported_chain_ids(plugin.as_ref(), action)
			.await?;
		Ok(chains.iter().copied().collect())
	}

	/// Tokens a registered plugin accepts for `action` on `chain_id`, in ascending
	/// order. Empty means the plugin does not restrict tokens.
	pub async fn get_supported_token_addresses(
		&self,
		plugin_id: &str,
		action: ActionType,
		chain_id: u64,
	) -> Result<Vec<Address>, DispatchError> {
		let plugin = self.plugin(plugin_id).await?;
		let tokens = self
			.capabilities
			.supported_token_addresses(plugin.as_ref(), chain_id, action)
			.await?;
		Ok(tokens.iter().copied().collect())
	}

	/// Builds filters for `action` from every applicable plugin.
	///
	/// Dropping the returned future drops every outstanding plugin call.
	#[instrument(skip_all, fields(action = %action))]
	pub async fn dispatch(
		&self,
		action: ActionType,
		params: &ActionParams,
	) -> Result<DispatchOutcome, DispatchError> {
		let validated = validate_params(action, params).map_err(|e| {
			tracing::warn!(error = %e, trace_id = %e.trace_id(), "rejected action parameters");
			record_validation_error(action.as_str(), e.kind());
			e
		})?;

		let candidates: Vec<Arc<dyn ActionPlugin>> = self
			.registry
			.snapshot()
			.await
			.into_iter()
			.filter(|plugin| plugin.supports(action))
			.collect();

		let token = schema_for(action)
			.token_field
			.and_then(|field| validated.address(field));

		tracing::debug!(
			candidates = candidates.len(),
			chain_id = validated.chain_id(),
			token = ?token,
			"dispatching to plugins"
		);

		let evaluations = candidates
			.iter()
			.map(|plugin| self.evaluate(plugin.as_ref(), &validated, token))
			.collect::<Vec<_>>();

		// Both strategies yield evaluations in candidate order
		let evaluations: Vec<Evaluation> = match self.config.max_concurrency {
			Some(limit) => stream::iter(evaluations).buffered(limit).collect().await,
			None => join_all(evaluations).await,
		};

		let mut outcome = DispatchOutcome::default();
		for (plugin, evaluation) in candidates.iter().zip(evaluations) {
			let plugin_id = plugin.plugin_id().to_string();
			match evaluation {
				Evaluation::Filter(filter) => outcome.results.push(PluginFilter {
					plugin_id,
					chain_id: filter.chain_id(),
					filter,
				}),
				Evaluation::Failed(cause) => {
					tracing::warn!(
						plugin_id = %plugin_id,
						kind = cause.kind(),
						trace_id = %cause.trace_id(),
						error = %cause,
						"plugin failed during dispatch"
					);
					record_plugin_failure(&plugin_id, cause.kind());
					outcome.failures.push(PluginFailure { plugin_id, cause });
				}
				Evaluation::NotSupported | Evaluation::Skipped => {}
			}
		}

		record_dispatch(action.as_str(), outcome.results.len());
		tracing::debug!(
			results = outcome.results.len(),
			failures = outcome.failures.len(),
			"dispatch completed"
		);

		Ok(outcome)
	}

	/// Same as [`dispatch`](Self::dispatch), abandoned as soon as `shutdown`
	/// becomes `true`. A cancelled dispatch delivers nothing.
	pub async fn dispatch_with_shutdown(
		&self,
		action: ActionType,
		params: &ActionParams,
		mut shutdown: watch::Receiver<bool>,
	) -> Result<DispatchOutcome, DispatchError> {
		tokio::select! {
			biased;
			_ = wait_for_shutdown(&mut shutdown) => {
				tracing::info!(action = %action, "dispatch cancelled by shutdown");
				Err(DispatchError::cancelled(
					"shutdown requested before dispatch completed",
					None,
					Some(HashMap::from([("action".to_string(), action.to_string())])),
				))
			}
			result = self.dispatch(action, params) => result,
		}
	}

	async fn plugin(&self, plugin_id: &str) -> Result<Arc<dyn ActionPlugin>, RegistryError> {
		self.registry.get(plugin_id).await.ok_or_else(|| {
			RegistryError::unknown_plugin(
				format!("plugin '{}' is not registered", plugin_id),
				None,
				Some(HashMap::from([(
					"plugin_id".to_string(),
					plugin_id.to_string(),
				)])),
			)
		})
	}

	async fn evaluate(
		&self,
		plugin: &dyn ActionPlugin,
		params: &ValidatedParams,
		token: Option<Address>,
	) -> Evaluation {
		let action = params.action();
		let chain_id = params.chain_id();

		let chains = match self.capabilities.supported_chain_ids(plugin, action).await {
			Ok(chains) => chains,
			Err(e) => return Evaluation::Failed(e),
		};
		if !chains.contains(&chain_id) {
			tracing::debug!(
				plugin_id = plugin.plugin_id(),
				chain_id,
				"plugin does not support chain"
			);
			return Evaluation::Skipped;
		}

		if let Some(token) = token {
			let tokens = match self
				.capabilities
				.supported_token_addresses(plugin, chain_id, action)
				.await
			{
				Ok(tokens) => tokens,
				Err(e) => return Evaluation::Failed(e),
			};
			if !tokens.is_empty() && !tokens.contains(&token) {
				tracing::debug!(
					plugin_id = plugin.plugin_id(),
					%token,
					"plugin does not support token"
				);
				return Evaluation::Skipped;
			}
		}

		let timeout = self.config.plugin_timeout();
		match tokio::time::timeout(timeout, plugin.build_filter(params)).await {
			Ok(Ok(BuildOutcome::Implemented(filter))) => Evaluation::Filter(filter),
			Ok(Ok(BuildOutcome::NotSupported)) => Evaluation::NotSupported,
			Ok(Err(e)) => Evaluation::Failed(e),
			Err(elapsed) => Evaluation::Failed(PluginError::timeout(
				format!("builder did not finish within {}ms", timeout.as_millis()),
				Some(Box::new(elapsed)),
				Some(HashMap::from([
					("plugin_id".to_string(), plugin.plugin_id().to_string()),
					("action".to_string(), action.to_string()),
				])),
			)),
		}
	}
}

/// Resolves once the flag is `true`. Never resolves if the sender is dropped first.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
	loop {
		if *shutdown.borrow_and_update() {
			return;
		}
		if shutdown.changed().await.is_err() {
			futures::future::pending::<()>().await;
		}
	}
}
