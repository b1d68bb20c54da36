//! Error types for plugin operations.
//!
//! A plugin error never aborts a dispatch: the dispatcher records it as a
//! per-plugin failure and logs it once.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur while a plugin builds filters or answers
/// capability queries
#[derive(ThisError, Debug)]
pub enum PluginError {
	/// The builder could not produce a filter
	#[error("Build failed: {0}")]
	BuildFailed(ErrorContext),

	/// The plugin did not answer within the configured time
	#[error("Timed out: {0}")]
	Timeout(ErrorContext),

	/// Supported chains or tokens could not be determined
	#[error("Capability query failed: {0}")]
	CapabilityQuery(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl PluginError {
	// Build failure
	pub fn build_failed(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::BuildFailed(ErrorContext::new(msg, source, metadata))
	}

	// Timeout
	pub fn timeout(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::Timeout(ErrorContext::new(msg, source, metadata))
	}

	// Capability query failure
	pub fn capability_query(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::CapabilityQuery(ErrorContext::new(msg, source, metadata))
	}

	/// Takes back an error shared by every caller of one capability query.
	///
	/// The last holder gets the original. Other callers get a detached copy of
	/// the same kind and trace id.
	pub fn from_shared(error: Arc<PluginError>) -> Self {
		Arc::try_unwrap(error).unwrap_or_else(|shared| shared.detached())
	}

	fn detached(&self) -> Self {
		match self {
			Self::BuildFailed(ctx) => Self::BuildFailed(ctx.detached()),
			Self::Timeout(ctx) => Self::Timeout(ctx.detached()),
			Self::CapabilityQuery(ctx) => Self::CapabilityQuery(ctx.detached()),
			Self::Other(e) => Self::Other(anyhow::anyhow!("{:#}", e)),
		}
	}

	/// Short name of the error kind, used as a metric label.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::BuildFailed(_) => "build_failed",
			Self::Timeout(_) => "timeout",
			Self::CapabilityQuery(_) => "capability_query",
			Self::Other(_) => "other",
		}
	}
}

impl TraceableError for PluginError {
	fn trace_id(&self) -> String {
		match self {
			Self::BuildFailed(ctx) => ctx.trace_id.clone(),
			Self::Timeout(ctx) => ctx.trace_id.clone(),
			Self::CapabilityQuery(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
