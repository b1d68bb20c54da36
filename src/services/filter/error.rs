//! Error types for filter operations.
//!
//! Defines the error cases that can occur while constructing operators and
//! coercing operand values into a field domain.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur during filter operations
#[derive(ThisError, Debug)]
pub enum FilterError {
	/// A `between` operator whose lower bound exceeds its upper bound
	#[error("Invalid range: {0}")]
	InvalidRange(ErrorContext),

	/// An operand that does not belong to the field's domain
	#[error("Type mismatch: {0}")]
	TypeMismatch(ErrorContext),

	/// An operator that cannot be applied to the field's domain
	#[error("Unsupported operator: {0}")]
	UnsupportedOperator(ErrorContext),

	/// A transaction filter that cannot match anything as assembled
	#[error("Invalid filter: {0}")]
	InvalidFilter(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl FilterError {
	// Invalid range error
	pub fn invalid_range(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InvalidRange(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Type mismatch error
	pub fn type_mismatch(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::TypeMismatch(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Unsupported operator error
	pub fn unsupported_operator(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnsupportedOperator(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Invalid filter error
	pub fn invalid_filter(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InvalidFilter(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for FilterError {
	fn trace_id(&self) -> String {
		match self {
			Self::InvalidRange(ctx) => ctx.trace_id.clone(),
			Self::TypeMismatch(ctx) => ctx.trace_id.clone(),
			Self::UnsupportedOperator(ctx) => ctx.trace_id.clone(),
			Self::InvalidFilter(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
