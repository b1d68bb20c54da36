//! Integration tests for the quest factory plugin.
//!
//! Tests the plugin through the dispatcher with per-chain factory deployments
//! served by a mocked metadata source.

use alloy::primitives::Address;
use mockall::predicate::{always, eq};
use serde_json::json;
use std::sync::Arc;

use action_filter_registry::{
	models::{ActionType, Selector},
	services::{
		plugin::{PluginError, QuestFactoryBuilder, QUEST_CREATED_EVENT},
		registry::Dispatcher,
	},
	utils::tests::params::ParamsBuilder,
};

use crate::integration::mocks::{MockChainData, MockMetadata};

const MAINNET: u64 = 1;
const BASE: u64 = 8453;
const POLYGON: u64 = 137;

fn chain_data() -> MockChainData {
	let mut chain_data = MockChainData::new();
	chain_data
		.expect_supported_chain_ids()
		.with(eq(ActionType::Quest))
		.returning(|_| Ok(vec![MAINNET, BASE, POLYGON]));
	chain_data
		.expect_supported_token_addresses()
		.returning(|_, _| Ok(vec![]));
	chain_data
}

fn metadata() -> MockMetadata {
	let mut metadata = MockMetadata::new();
	metadata
		.expect_contract_addresses()
		.with(eq(MAINNET), always())
		.returning(|_, _| Ok(vec![Address::repeat_byte(0x02), Address::repeat_byte(0x01)]));
	metadata
		.expect_contract_addresses()
		.with(eq(BASE), always())
		.returning(|_, _| Ok(vec![Address::repeat_byte(0x03)]));
	metadata
		.expect_contract_addresses()
		.with(eq(POLYGON), always())
		.returning(|_, _| Err(anyhow::anyhow!("metadata service timeout")));
	metadata
		.expect_contract_addresses()
		.returning(|_, _| Ok(vec![]));
	metadata.expect_signature().returning(|_, _| Ok(None));
	metadata
}

async fn dispatcher() -> Dispatcher {
	let dispatcher = Dispatcher::default();
	let plugin = QuestFactoryBuilder::new(Arc::new(metadata())).into_plugin("quests", Arc::new(chain_data()));
	dispatcher.register_plugin(Arc::new(plugin)).await.unwrap();
	dispatcher
}

#[tokio::test]
async fn test_filter_covers_every_factory_on_chain() {
	let dispatcher = dispatcher().await;

	let outcome = dispatcher
		.dispatch(ActionType::Quest, &ParamsBuilder::swap(MAINNET).build())
		.await
		.unwrap();

	assert_eq!(outcome.results.len(), 1);
	let filter = &outcome.results[0].filter;
	assert_eq!(
		filter.contracts(),
		&[Address::repeat_byte(0x01), Address::repeat_byte(0x02)]
	);
	assert_eq!(filter.selector(), &Selector::event(QUEST_CREATED_EVENT));
	assert!(filter.predicates().values().all(|p| p.is_any()));

	let outcome = dispatcher
		.dispatch(ActionType::Quest, &ParamsBuilder::swap(BASE).build())
		.await
		.unwrap();
	assert_eq!(outcome.results[0].chain_id, BASE);
	assert_eq!(outcome.results[0].filter.contracts(), &[Address::repeat_byte(0x03)]);
}

#[tokio::test]
async fn test_metadata_failure_is_reported_per_plugin() {
	let dispatcher = dispatcher().await;

	let outcome = dispatcher
		.dispatch(ActionType::Quest, &ParamsBuilder::swap(POLYGON).build())
		.await
		.unwrap();

	assert!(outcome.results.is_empty());
	assert_eq!(outcome.failed_plugin_ids(), vec!["quests"]);
	assert!(matches!(outcome.failures[0].cause, PluginError::BuildFailed(_)));
}

#[tokio::test]
async fn test_unsupported_chain_and_action_yield_nothing() {
	let dispatcher = dispatcher().await;

	// Chain 10 is not in the plugin's supported set
	let outcome = dispatcher
		.dispatch(ActionType::Quest, &ParamsBuilder::swap(10).build())
		.await
		.unwrap();
	assert!(outcome.results.is_empty());
	assert!(outcome.failures.is_empty());

	let outcome = dispatcher
		.dispatch(ActionType::Vote, &ParamsBuilder::swap(MAINNET).build())
		.await
		.unwrap();
	assert!(outcome.results.is_empty());
	assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn test_operator_params_become_event_predicates() {
	let dispatcher = dispatcher().await;

	let params = ParamsBuilder::swap(MAINNET)
		.between("endTime", 1_700_000_000, 1_800_000_000)
		.field("actionSpec", json!("swap"))
		.build();
	let outcome = dispatcher.dispatch(ActionType::Quest, &params).await.unwrap();
	let filter = &outcome.results[0].filter;

	let serialized = serde_json::to_value(filter).unwrap();
	assert_eq!(serialized["predicates"]["endTime"]["operator"]["op"], "between");
	assert!(!filter.predicate("actionType").unwrap().is_any());
	assert!(filter.predicate("rewardToken").unwrap().is_any());
}
