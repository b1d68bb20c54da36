//! Core services implementing the business logic.
//!
//! This module contains the main service implementations:
//! - `filter`: Typed operands, operators and matching
//! - `schema`: Per-action parameter schemas and validation
//! - `plugin`: Action plugin contracts and the quest factory plugin
//! - `capability`: Coalescing cache of plugin capabilities
//! - `registry`: Plugin registry and dispatcher

pub mod capability;
pub mod filter;
pub mod plugin;
pub mod registry;
pub mod schema;
