//! Domain models and data structures for the action-filter engine.
//!
//! This module contains the core data structures used throughout the crate:
//!
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (ActionType, ActionParams, TransactionFilter)

mod config;
mod core;

// Re-export core types
pub use core::{
	ActionParams, ActionType, FieldPredicate, FieldValue, ObservedAction, OrderType, ParamInput,
	RawOperator, Selector, TransactionFilter, TransactionFilterBuilder, ValidatedParams,
};

// Re-export config types
pub use config::{
	ConfigError, ConfigLoader, DispatcherConfig, ENV_CAPABILITY_TIMEOUT_MS, ENV_MAX_CONCURRENCY,
	ENV_PLUGIN_TIMEOUT_MS,
};
