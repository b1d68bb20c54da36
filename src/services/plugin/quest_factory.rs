//! Reference plugin recognizing quests created through a quest factory.
//!
//! Quest filters match the factory's `QuestCreated` event. Parameter fields map
//! onto event arguments as follows:
//!
//! | parameter           | event argument          |
//! |---------------------|-------------------------|
//! | `rewardToken`       | `rewardToken`           |
//! | `rewardAmount`      | `rewardAmountOrTokenId` |
//! | `startTime`         | `startTime`             |
//! | `endTime`           | `endTime`               |
//! | `totalParticipants` | `totalParticipants`     |
//! | `actionSpec`        | `actionType`            |

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};

use crate::{
	models::{ActionType, Selector, TransactionFilter, ValidatedParams},
	services::plugin::{
		composed::ComposedPlugin,
		error::PluginError,
		traits::{BuildOutcome, ChainDataSource, ContractMetadataSource, TransactionFilterBuilder},
	},
};

pub const QUEST_CREATED_EVENT: &str = "QuestCreated(address,address,string,string,string,string,string,uint32,address,uint256,uint256,uint256,uint256)";

const FIELD_MAPPING: &[(&str, &str)] = &[
	("rewardToken", "rewardToken"),
	("rewardAmount", "rewardAmountOrTokenId"),
	("startTime", "startTime"),
	("endTime", "endTime"),
	("totalParticipants", "totalParticipants"),
	("actionSpec", "actionType"),
];

/// Builds quest filters over the quest factory deployments a metadata source knows.
pub struct QuestFactoryBuilder {
	metadata: Arc<dyn ContractMetadataSource>,
}

impl QuestFactoryBuilder {
	pub fn new(metadata: Arc<dyn ContractMetadataSource>) -> Self {
		Self { metadata }
	}

	/// Wraps the builder in a plugin declaring only [`ActionType::Quest`].
	pub fn into_plugin(
		self,
		plugin_id: impl Into<String>,
		chain_data: Arc<dyn ChainDataSource>,
	) -> ComposedPlugin {
		ComposedPlugin::new(plugin_id, chain_data).with_builder(ActionType::Quest, Arc::new(self))
	}
}

#[async_trait]
impl TransactionFilterBuilder for QuestFactoryBuilder {
	async fn build(&self, params: &ValidatedParams) -> Result<BuildOutcome, PluginError> {
		if params.action() != ActionType::Quest {
			return Ok(BuildOutcome::NotSupported);
		}

		let chain_id = params.chain_id();
		let metadata = || {
			HashMap::from([
				("chain_id".to_string(), chain_id.to_string()),
				("action".to_string(), ActionType::Quest.to_string()),
			])
		};

		let factories = self
			.metadata
			.contract_addresses(chain_id, ActionType::Quest)
			.await
			.map_err(|e| {
				PluginError::build_failed(
					"failed to load quest factory deployments",
					Some(e.into()),
					Some(metadata()),
				)
			})?;

		if factories.is_empty() {
			tracing::debug!(chain_id, "no quest factory deployed");
			return Ok(BuildOutcome::NotSupported);
		}

		let signature = self
			.metadata
			.signature(chain_id, ActionType::Quest)
			.await
			.map_err(|e| {
				PluginError::build_failed(
					"failed to load quest factory signature",
					Some(e.into()),
					Some(metadata()),
				)
			})?
			.unwrap_or_else(|| QUEST_CREATED_EVENT.to_string());

		let filter = FIELD_MAPPING
			.iter()
			.fold(
				TransactionFilter::builder(chain_id, Selector::event(&signature))
					.contracts(factories),
				|builder, (param, argument)| builder.predicate(*argument, params.predicate(param)),
			)
			.build()
			.map_err(|e| {
				PluginError::build_failed(
					"failed to assemble quest filter",
					Some(Box::new(e)),
					Some(metadata()),
				)
			})?;

		Ok(BuildOutcome::Implemented(filter))
	}
}
