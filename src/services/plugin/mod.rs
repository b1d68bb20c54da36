//! Action plugin contracts and reference implementations.
//!
//! - `ActionPlugin`: what the registry dispatches to
//! - `TransactionFilterBuilder`: per-action filter construction
//! - `ComposedPlugin`: a plugin assembled from builders and a chain data source
//! - `QuestFactoryBuilder`: quest filters over the quest factory's creation event

mod composed;
mod error;
mod quest_factory;
mod traits;

pub use composed::ComposedPlugin;
pub use error::PluginError;
pub use quest_factory::{QuestFactoryBuilder, QUEST_CREATED_EVENT};
pub use traits::{
	ActionPlugin, BuildOutcome, ChainDataSource, ContractMetadataSource, TransactionFilterBuilder,
};
