//! Integration tests for dispatching action requests.
//!
//! Tests candidate selection, aggregation order, failure isolation and the
//! interaction between plugins built from mocked data sources and in-memory
//! test plugins.

use alloy::primitives::{keccak256, Address, Bytes, U256};
use serde_json::json;
use std::{collections::HashMap, sync::Arc, time::Duration};

use action_filter_registry::{
	models::{
		ActionParams, ActionType, DispatcherConfig, FieldPredicate, ObservedAction, RawOperator,
	},
	services::{
		filter::{FilterOperator, FilterValue},
		plugin::{ActionPlugin, PluginError, QuestFactoryBuilder, QUEST_CREATED_EVENT},
		registry::{DispatchError, Dispatcher},
		schema::ValidationError,
	},
	utils::tests::{params::ParamsBuilder, plugin::TestPluginBuilder},
};

use crate::integration::mocks::{MockChainData, MockMetadata};

fn quest_factory() -> Address {
	Address::repeat_byte(0x0f)
}

fn reward_token() -> Address {
	Address::repeat_byte(0x0e)
}

fn quest_plugin(chains: Vec<u64>, tokens: Vec<Address>) -> Arc<dyn ActionPlugin> {
	let mut chain_data = MockChainData::new();
	chain_data
		.expect_supported_chain_ids()
		.returning(move |_| Ok(chains.clone()));
	chain_data
		.expect_supported_token_addresses()
		.returning(move |_, _| Ok(tokens.clone()));

	let mut metadata = MockMetadata::new();
	metadata
		.expect_contract_addresses()
		.returning(|_, _| Ok(vec![quest_factory()]));
	metadata.expect_signature().returning(|_, _| Ok(None));

	Arc::new(
		QuestFactoryBuilder::new(Arc::new(metadata)).into_plugin("rabbithole", Arc::new(chain_data)),
	)
}

#[tokio::test]
async fn test_quest_dispatch_produces_event_filter() {
	let dispatcher = Dispatcher::default();
	dispatcher
		.register_plugin(quest_plugin(vec![10], vec![reward_token()]))
		.await
		.unwrap();

	let params = ParamsBuilder::swap(10)
		.address("rewardToken", reward_token())
		.gte("rewardAmount", 1_000)
		.field("actionSpec", json!("Mint"))
		.build();

	let outcome = dispatcher.dispatch(ActionType::Quest, &params).await.unwrap();
	assert!(outcome.failures.is_empty());
	assert_eq!(outcome.plugin_ids(), vec!["rabbithole"]);

	let result = &outcome.results[0];
	assert_eq!(result.chain_id, 10);
	assert_eq!(result.filter.contracts(), &[quest_factory()]);
	assert_eq!(result.filter.selector().signature(), QUEST_CREATED_EVENT);

	// Unset quest fields place no constraint on the event
	assert!(result.filter.predicate("startTime").unwrap().is_any());
	assert_eq!(
		result.filter.predicate("rewardAmountOrTokenId"),
		Some(&FieldPredicate::Operator(FilterOperator::Gte {
			value: FilterValue::Uint(U256::from(1_000u64)),
		}))
	);

	let observed = ObservedAction {
		chain_id: 10,
		contract: quest_factory(),
		selector: Bytes::copy_from_slice(keccak256(QUEST_CREATED_EVENT.as_bytes()).as_slice()),
		fields: HashMap::from([
			("rewardToken".to_string(), FilterValue::Address(reward_token())),
			(
				"rewardAmountOrTokenId".to_string(),
				FilterValue::Uint(U256::from(5_000u64)),
			),
			("actionType".to_string(), FilterValue::Text("mint".to_string())),
		]),
	};
	assert!(result.filter.matches(&observed));

	let too_small = ObservedAction {
		fields: HashMap::from([
			("rewardToken".to_string(), FilterValue::Address(reward_token())),
			(
				"rewardAmountOrTokenId".to_string(),
				FilterValue::Uint(U256::from(10u64)),
			),
			("actionType".to_string(), FilterValue::Text("mint".to_string())),
		]),
		..observed
	};
	assert!(!result.filter.matches(&too_small));
}

#[tokio::test]
async fn test_empty_registry_yields_empty_outcome() {
	let dispatcher = Dispatcher::default();

	let outcome = dispatcher
		.dispatch(ActionType::Swap, &ParamsBuilder::swap(1).build())
		.await
		.unwrap();
	assert!(outcome.results.is_empty());
	assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn test_swap_request_produces_filter_from_mainnet_plugin_only() {
	let token_in = Address::repeat_byte(0xaa);
	let dispatcher = Dispatcher::default();
	let mainnet = TestPluginBuilder::new("mainnet-router").chains(vec![1]).build();
	let optimism = TestPluginBuilder::new("optimism-router").chains(vec![10]).build();
	dispatcher.register_plugin(mainnet.clone()).await.unwrap();
	dispatcher.register_plugin(optimism.clone()).await.unwrap();

	let params: ActionParams = serde_json::from_value(json!({
		"chainId": 1,
		"tokenIn": token_in.to_string(),
		"amountIn": {"op": "gte", "value": 1000},
	}))
	.unwrap();
	let outcome = dispatcher.dispatch(ActionType::Swap, &params).await.unwrap();

	assert!(outcome.failures.is_empty());
	assert_eq!(outcome.plugin_ids(), vec!["mainnet-router"]);
	assert_eq!(optimism.build_calls(), 0);

	let result = &outcome.results[0];
	assert_eq!(result.chain_id, 1);
	assert_eq!(result.filter.chain_id(), 1);
	assert_eq!(
		result.filter.predicate("tokenIn"),
		Some(&FieldPredicate::Exact(FilterValue::Address(token_in)))
	);
	assert_eq!(
		result.filter.predicate("amountIn"),
		Some(&FieldPredicate::Operator(FilterOperator::Gte {
			value: FilterValue::Uint(U256::from(1000u64)),
		}))
	);
}

#[tokio::test]
async fn test_results_follow_registration_order_not_completion_order() {
	let dispatcher = Dispatcher::default();
	let delays = [("slow", 40), ("fast", 0), ("medium", 15)];
	for (id, delay) in delays {
		dispatcher
			.register_plugin(
				TestPluginBuilder::new(id)
					.delay(Duration::from_millis(delay))
					.build_arc(),
			)
			.await
			.unwrap();
	}

	let outcome = dispatcher
		.dispatch(ActionType::Swap, &ParamsBuilder::swap(1).build())
		.await
		.unwrap();

	assert_eq!(outcome.plugin_ids(), vec!["slow", "fast", "medium"]);
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_results() {
	let config = DispatcherConfig {
		plugin_timeout_ms: 50,
		..DispatcherConfig::default()
	};
	let dispatcher = Dispatcher::new(config).unwrap();

	dispatcher
		.register_plugin(TestPluginBuilder::new("broken").failing("router offline").build_arc())
		.await
		.unwrap();
	dispatcher
		.register_plugin(TestPluginBuilder::new("stuck").hanging().build_arc())
		.await
		.unwrap();
	dispatcher
		.register_plugin(TestPluginBuilder::new("healthy").build_arc())
		.await
		.unwrap();
	dispatcher
		.register_plugin(TestPluginBuilder::new("unsupported").not_supported().build_arc())
		.await
		.unwrap();

	let outcome = dispatcher
		.dispatch(ActionType::Swap, &ParamsBuilder::swap(1).build())
		.await
		.unwrap();

	assert_eq!(outcome.plugin_ids(), vec!["healthy"]);
	assert_eq!(outcome.failed_plugin_ids(), vec!["broken", "stuck"]);
	assert!(matches!(outcome.failures[0].cause, PluginError::BuildFailed(_)));
	assert!(matches!(outcome.failures[1].cause, PluginError::Timeout(_)));
}

#[tokio::test]
async fn test_invalid_params_reach_no_plugin() {
	let dispatcher = Dispatcher::default();
	let plugin = TestPluginBuilder::new("uniswap").build();
	dispatcher.register_plugin(plugin.clone()).await.unwrap();

	let cases: Vec<(ActionParams, &str)> = vec![
		(ParamsBuilder::new().build(), "missing_required_field"),
		(
			ParamsBuilder::swap(1).field("slippage", json!(5)).build(),
			"unknown_field",
		),
		(
			ParamsBuilder::swap(1).field("amountIn", json!("lots")).build(),
			"invalid_field_type",
		),
		(
			ParamsBuilder::swap(1).between("amountIn", 10, 1).build(),
			"invalid_range",
		),
	];

	for (params, expected) in cases {
		match dispatcher.dispatch(ActionType::Swap, &params).await {
			Err(DispatchError::Validation(e)) => assert_eq!(e.kind(), expected, "{}", e),
			other => panic!("expected a validation error, got {:?}", other),
		}
	}

	assert_eq!(plugin.chain_queries(), 0);
	assert_eq!(plugin.build_calls(), 0);
}

#[tokio::test]
async fn test_bridge_dispatch_uses_source_chain() {
	let dispatcher = Dispatcher::default();
	dispatcher
		.register_plugin(
			TestPluginBuilder::new("across")
				.actions(vec![ActionType::Bridge])
				.chains(vec![1, 42161])
				.build_arc(),
		)
		.await
		.unwrap();

	let to_arbitrum = ParamsBuilder::bridge(1, 42161).build();
	let outcome = dispatcher.dispatch(ActionType::Bridge, &to_arbitrum).await.unwrap();
	assert_eq!(outcome.results.len(), 1);
	assert_eq!(outcome.results[0].chain_id, 1);

	// Source chain 10 is not served even though the plugin knows the destination
	let from_optimism = ParamsBuilder::bridge(10, 1).build();
	let outcome = dispatcher.dispatch(ActionType::Bridge, &from_optimism).await.unwrap();
	assert!(outcome.results.is_empty());
	assert!(outcome.failures.is_empty());

	let same_chain = ParamsBuilder::bridge(1, 1).build();
	let error = dispatcher.dispatch(ActionType::Bridge, &same_chain).await.unwrap_err();
	assert!(matches!(
		error,
		DispatchError::Validation(ValidationError::InvalidBridgeRoute(_))
	));
}

#[tokio::test]
async fn test_token_restriction_selects_plugins() {
	let usdc = Address::repeat_byte(0xaa);
	let weth = Address::repeat_byte(0xbb);

	let dispatcher = Dispatcher::default();
	dispatcher
		.register_plugin(TestPluginBuilder::new("usdc-only").tokens(vec![usdc]).build_arc())
		.await
		.unwrap();
	dispatcher
		.register_plugin(TestPluginBuilder::new("any-token").build_arc())
		.await
		.unwrap();

	let weth_swap = ParamsBuilder::swap(1).address("tokenIn", weth).build();
	let outcome = dispatcher.dispatch(ActionType::Swap, &weth_swap).await.unwrap();
	assert_eq!(outcome.plugin_ids(), vec!["any-token"]);

	let usdc_swap = ParamsBuilder::swap(1).address("tokenIn", usdc).build();
	let outcome = dispatcher.dispatch(ActionType::Swap, &usdc_swap).await.unwrap();
	assert_eq!(outcome.plugin_ids(), vec!["usdc-only", "any-token"]);

	// A set of tokens is not an exact token, so no plugin is excluded by it
	let either = ParamsBuilder::swap(1)
		.operator(
			"tokenIn",
			RawOperator::In {
				values: vec![json!(weth.to_string()), json!(usdc.to_string())],
			},
		)
		.build();
	let outcome = dispatcher.dispatch(ActionType::Swap, &either).await.unwrap();
	assert_eq!(outcome.plugin_ids(), vec!["usdc-only", "any-token"]);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
	let dispatcher = Dispatcher::default();
	dispatcher
		.register_plugin(TestPluginBuilder::new("uniswap").build_arc())
		.await
		.unwrap();

	let error = dispatcher
		.register_plugin(TestPluginBuilder::new("uniswap").chains(vec![10]).build_arc())
		.await
		.unwrap_err();
	assert!(error.to_string().contains("uniswap"));
	assert_eq!(dispatcher.plugin_ids().await, vec!["uniswap".to_string()]);

	dispatcher.unregister_plugin("uniswap").await;
	assert!(dispatcher.plugin_ids().await.is_empty());

	let outcome = dispatcher
		.dispatch(ActionType::Swap, &ParamsBuilder::swap(1).build())
		.await
		.unwrap();
	assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn test_bounded_concurrency_matches_unbounded_results() {
	let unbounded = Dispatcher::default();
	let bounded = Dispatcher::new(DispatcherConfig {
		max_concurrency: Some(1),
		..DispatcherConfig::default()
	})
	.unwrap();

	for dispatcher in [&unbounded, &bounded] {
		for (id, delay) in [("a", 10), ("b", 0), ("c", 5)] {
			dispatcher
				.register_plugin(
					TestPluginBuilder::new(id)
						.delay(Duration::from_millis(delay))
						.build_arc(),
				)
				.await
				.unwrap();
		}
	}

	let params = ParamsBuilder::swap(1).gte("amountIn", 100).build();
	let left = unbounded.dispatch(ActionType::Swap, &params).await.unwrap();
	let right = bounded.dispatch(ActionType::Swap, &params).await.unwrap();
	assert_eq!(left.results, right.results);
}
