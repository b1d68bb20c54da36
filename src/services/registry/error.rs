//! Error types for registry management and dispatching.

use crate::{
	services::{plugin::PluginError, schema::ValidationError},
	utils::logging::error::{ErrorContext, TraceableError},
};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents misuse of the plugin registry
#[derive(ThisError, Debug)]
pub enum RegistryError {
	/// A plugin with the same id is already registered
	#[error("Duplicate plugin id: {0}")]
	DuplicatePluginId(ErrorContext),

	/// No plugin with the requested id is registered
	#[error("Unknown plugin: {0}")]
	UnknownPlugin(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl RegistryError {
	// Duplicate plugin id error
	pub fn duplicate_plugin_id(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::DuplicatePluginId(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Unknown plugin error
	pub fn unknown_plugin(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnknownPlugin(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for RegistryError {
	fn trace_id(&self) -> String {
		match self {
			Self::DuplicatePluginId(ctx) => ctx.trace_id.clone(),
			Self::UnknownPlugin(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}

/// Represents errors that end a dispatcher call
#[derive(ThisError, Debug)]
pub enum DispatchError {
	/// The parameters were rejected before any plugin was invoked
	#[error("Validation failed: {0}")]
	Validation(#[from] ValidationError),

	/// The registry could not serve the request
	#[error("Registry error: {0}")]
	Registry(#[from] RegistryError),

	/// A capability query of a single plugin failed
	#[error("Plugin error: {0}")]
	Plugin(#[from] PluginError),

	/// Shutdown was requested before the aggregate was complete
	#[error("Dispatch cancelled: {0}")]
	Cancelled(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl DispatchError {
	// Cancellation
	pub fn cancelled(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::Cancelled(ErrorContext::new(msg, source, metadata))
	}
}

impl TraceableError for DispatchError {
	fn trace_id(&self) -> String {
		match self {
			Self::Validation(err) => err.trace_id(),
			Self::Registry(err) => err.trace_id(),
			Self::Plugin(err) => err.trace_id(),
			Self::Cancelled(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
