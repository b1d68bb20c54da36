//! Error types for action parameter validation.

use crate::{
	services::filter::FilterError,
	utils::logging::error::{ErrorContext, TraceableError},
};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur while validating action parameters
///
/// Created without logging. The dispatcher logs each rejected request.
#[derive(ThisError, Debug)]
pub enum ValidationError {
	/// A required field is absent
	#[error("Missing required field: {0}")]
	MissingRequiredField(ErrorContext),

	/// A field value or operator does not fit the field's domain
	#[error("Invalid field type: {0}")]
	InvalidFieldType(ErrorContext),

	/// A field the action's schema does not declare
	#[error("Unknown field: {0}")]
	UnknownField(ErrorContext),

	/// Source and destination chains of a bridge are the same
	#[error("Invalid bridge route: {0}")]
	InvalidBridgeRoute(ErrorContext),

	/// A range operator whose lower bound exceeds its upper bound
	#[error("Invalid range: {0}")]
	InvalidRange(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl ValidationError {
	// Missing required field error
	pub fn missing_required_field(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::MissingRequiredField(ErrorContext::new(msg, source, metadata))
	}

	// Invalid field type error
	pub fn invalid_field_type(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InvalidFieldType(ErrorContext::new(msg, source, metadata))
	}

	// Unknown field error
	pub fn unknown_field(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnknownField(ErrorContext::new(msg, source, metadata))
	}

	// Invalid bridge route error
	pub fn invalid_bridge_route(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InvalidBridgeRoute(ErrorContext::new(msg, source, metadata))
	}

	// Invalid range error
	pub fn invalid_range(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InvalidRange(ErrorContext::new(msg, source, metadata))
	}

	/// Maps an operand or operator error raised while coercing `field`.
	///
	/// The original context, including its trace id, is kept.
	pub fn from_filter_error(field: &str, error: FilterError) -> Self {
		match error {
			FilterError::InvalidRange(ctx) => {
				Self::InvalidRange(ctx.with_metadata("field", field))
			}
			FilterError::TypeMismatch(ctx)
			| FilterError::UnsupportedOperator(ctx)
			| FilterError::InvalidFilter(ctx) => {
				Self::InvalidFieldType(ctx.with_metadata("field", field))
			}
			FilterError::Other(e) => Self::Other(e.context(format!("field {}", field))),
		}
	}

	/// Short name of the error kind, used as a metric label.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::MissingRequiredField(_) => "missing_required_field",
			Self::InvalidFieldType(_) => "invalid_field_type",
			Self::UnknownField(_) => "unknown_field",
			Self::InvalidBridgeRoute(_) => "invalid_bridge_route",
			Self::InvalidRange(_) => "invalid_range",
			Self::Other(_) => "other",
		}
	}
}

impl TraceableError for ValidationError {
	fn trace_id(&self) -> String {
		match self {
			Self::MissingRequiredField(ctx) => ctx.trace_id.clone(),
			Self::InvalidFieldType(ctx) => ctx.trace_id.clone(),
			Self::UnknownField(ctx) => ctx.trace_id.clone(),
			Self::InvalidBridgeRoute(ctx) => ctx.trace_id.clone(),
			Self::InvalidRange(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
