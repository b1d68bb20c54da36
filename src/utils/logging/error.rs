//! Error context shared by every error type of the crate.
//!
//! [`ErrorContext`] carries a message, an optional source, metadata, a timestamp
//! and a trace id. Wrapping an error keeps the trace id of its source, so a
//! failure can be followed from the plugin that raised it to the dispatch that
//! reported it.

use chrono::Utc;
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// How many sources are inspected when looking for an existing trace id
const MAX_TRACE_DEPTH: usize = 3;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message, cause and correlation data of a single error.
#[derive(Debug)]
pub struct ErrorContext {
	pub message: String,
	pub source: Option<BoxedSource>,
	pub metadata: Option<HashMap<String, String>>,
	/// RFC 3339
	pub timestamp: String,
	/// Inherited from `source` when it carries one, otherwise a fresh UUID v4
	pub trace_id: String,
}

impl ErrorContext {
	pub fn new(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let trace_id = match source.as_deref() {
			Some(src) => TraceableError::trace_id(src),
			None => Uuid::new_v4().to_string(),
		};

		Self {
			message: message.into(),
			source,
			metadata,
			timestamp: Utc::now().to_rfc3339(),
			trace_id,
		}
	}

	/// Same as [`ErrorContext::new`], and emits an `error!` event for it.
	pub fn new_with_log(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let context = Self::new(message, source, metadata);
		log_error(&context);
		context
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata
			.get_or_insert_with(HashMap::new)
			.insert(key.into(), value.into());
		self
	}

	/// Copy for callers that observed the same failure.
	///
	/// Message, metadata, timestamp and trace id are kept. The source chain stays
	/// with the original and is rendered into the copy's metadata under `cause`.
	pub fn detached(&self) -> Self {
		let mut metadata = self.metadata.clone();
		if let Some(source) = self.source.as_deref() {
			metadata
				.get_or_insert_with(HashMap::new)
				.entry("cause".to_string())
				.or_insert_with(|| format_error_chain(source));
		}

		Self {
			message: self.message.clone(),
			source: None,
			metadata,
			timestamp: self.timestamp.clone(),
			trace_id: self.trace_id.clone(),
		}
	}

	/// `"message [k1=v1, k2=v2]"`, keys sorted.
	pub fn format_with_metadata(&self) -> String {
		let mut pairs: Vec<_> = self.metadata.iter().flatten().collect();
		if pairs.is_empty() {
			return self.message.clone();
		}
		pairs.sort();

		let rendered: Vec<String> = pairs
			.into_iter()
			.map(|(key, value)| format!("{}={}", key, value))
			.collect();
		format!("{} [{}]", self.message, rendered.join(", "))
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.format_with_metadata())
	}
}

impl std::error::Error for ErrorContext {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source
			.as_deref()
			.map(|e| e as &(dyn std::error::Error + 'static))
	}
}

/// An error that can be correlated across layers by its trace id
pub trait TraceableError: std::error::Error + Send + Sync {
	fn trace_id(&self) -> String;
}

impl TraceableError for dyn std::error::Error + Send + Sync + 'static {
	fn trace_id(&self) -> String {
		let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
		let mut depth = 0;

		while let Some(err) = current {
			if let Some(id) = try_extract_trace_id(err) {
				return id;
			}
			if depth == MAX_TRACE_DEPTH {
				break;
			}
			depth += 1;
			current = err.source();
		}

		Uuid::new_v4().to_string()
	}
}

fn try_extract_trace_id(err: &(dyn std::error::Error + 'static)) -> Option<String> {
	if let Some(ctx) = err.downcast_ref::<ErrorContext>() {
		return Some(ctx.trace_id.clone());
	}

	macro_rules! try_downcast {
		($($ty:path),*) => {
			$(
				if let Some(e) = err.downcast_ref::<$ty>() {
					return Some(e.trace_id());
				}
			)*
		}
	}

	try_downcast!(
		crate::services::filter::FilterError,
		crate::services::schema::ValidationError,
		crate::services::plugin::PluginError,
		crate::services::registry::RegistryError,
		crate::services::registry::DispatchError,
		crate::models::ConfigError
	);

	None
}

/// Renders `err` followed by one `Caused by:` line per source
fn format_error_chain(err: &(dyn std::error::Error + 'static)) -> String {
	let mut result = err.to_string();
	let mut source = err.source();

	while let Some(err) = source {
		result.push_str("\n\tCaused by: ");
		result.push_str(&err.to_string());
		source = err.source();
	}

	result
}

fn log_error(error: &ErrorContext) {
	match error.source.as_deref() {
		Some(source) => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			error.chain = %format_error_chain(source),
			"Error occurred"
		),
		None => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			"Error occurred"
		),
	}
}
