//! Action-filter plugin registry and dispatch engine.
//!
//! This library lets independently developed action plugins describe, per blockchain
//! network, which on-chain transactions realize a logical user action (swap, bridge,
//! stake, mint, burn, delegate, quest, options order, vote). It includes:
//!
//! - Typed comparison operators and a pure predicate model
//! - Per-action parameter schemas with cross-field validation
//! - A capability cache that coalesces concurrent plugin queries
//! - A registry and dispatcher that fans out to plugins and aggregates their filters
//!
//! # Module Structure
//!
//! - `models`: Data structures for actions, parameters, filters and configuration
//! - `services`: Filter model, schemas, plugins, capability cache and dispatcher
//! - `utils`: Logging, metrics and test helpers

pub mod models;
pub mod services;
pub mod utils;
