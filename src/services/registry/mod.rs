//! Plugin registry and dispatcher.
//!
//! The [`Dispatcher`] is the entry point of the crate: it owns the registered
//! plugins and the capability cache, and turns an action request into the
//! filters of every applicable plugin.

mod dispatcher;
mod error;
mod plugins;

pub use dispatcher::{DispatchOutcome, Dispatcher, PluginFailure, PluginFilter};
pub use error::{DispatchError, RegistryError};
pub use plugins::PluginRegistry;
