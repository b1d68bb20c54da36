//! Integration tests for parameter validation across all action types.

use alloy::primitives::{address, U256};
use serde_json::json;

use action_filter_registry::{
	models::{ActionParams, ActionType, FieldPredicate},
	services::{
		filter::{FilterOperator, FilterValue},
		schema::{schema_for, validate_params, ValidationError},
	},
};

fn params(value: serde_json::Value) -> ActionParams {
	serde_json::from_value(value).unwrap()
}

/// Smallest accepted parameters for an action
fn minimal(action: ActionType) -> serde_json::Value {
	match action {
		ActionType::Bridge => json!({"sourceChainId": 1, "destinationChainId": 10}),
		ActionType::Mint | ActionType::Burn => json!({
			"chainId": 1,
			"contractAddress": "0x0000000000000000000000000000000000000001",
		}),
		ActionType::Delegate => json!({"chainId": 1, "project": "ENS"}),
		_ => json!({"chainId": 1}),
	}
}

#[test]
fn test_minimal_params_validate_for_every_action() {
	for action in ActionType::ALL {
		let validated = validate_params(action, &params(minimal(action)))
			.unwrap_or_else(|e| panic!("{} rejected minimal params: {}", action, e));
		assert_eq!(validated.action(), action);
		assert_eq!(validated.chain_id(), 1);
	}
}

#[test]
fn test_required_fields_are_enforced_for_every_action() {
	for action in ActionType::ALL {
		let schema = schema_for(action);
		for required in schema.required_fields() {
			let mut input = minimal(action);
			input.as_object_mut().unwrap().remove(required);

			let error = validate_params(action, &params(input)).unwrap_err();
			assert!(
				matches!(error, ValidationError::MissingRequiredField(_)),
				"{} without {} gave {}",
				action,
				required,
				error
			);
		}
	}
}

#[test]
fn test_null_field_counts_as_absent() {
	let validated = validate_params(
		ActionType::Swap,
		&params(json!({"chainId": 1, "recipient": null})),
	)
	.unwrap();
	assert!(validated.get("recipient").is_none());
	assert_eq!(validated.predicate("recipient"), FieldPredicate::Any);

	let error = validate_params(ActionType::Swap, &params(json!({"chainId": null}))).unwrap_err();
	assert!(matches!(error, ValidationError::MissingRequiredField(_)));
}

#[test]
fn test_full_swap_request_from_json() {
	let validated = validate_params(
		ActionType::Swap,
		&params(json!({
			"chainId": "0xa",
			"tokenIn": "0xA0B86991C6218B36C1D19D4A2E9EB0CE3606EB48",
			"tokenOut": {"op": "in", "values": [
				"0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
				"0xC02AAA39B223FE8D0A0E5C4F27EAD9083C756CC2"
			]},
			"amountIn": {"op": "between", "low": "1000", "high": "0xffff"},
			"deadline": {"op": "lt", "value": 1_800_000_000u64},
		})),
	)
	.unwrap();

	assert_eq!(validated.chain_id(), 10);
	assert_eq!(
		validated.address("tokenIn"),
		Some(address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"))
	);
	// Both spellings of WETH collapse into one member
	assert_eq!(
		validated.predicate("tokenOut"),
		FieldPredicate::Operator(FilterOperator::In {
			values: vec![FilterValue::Address(address!(
				"c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
			))],
		})
	);
	assert_eq!(
		validated.predicate("amountIn"),
		FieldPredicate::Operator(FilterOperator::Between {
			low: FilterValue::Uint(U256::from(1000u64)),
			high: FilterValue::Uint(U256::from(0xffffu64)),
		})
	);
}

#[test]
fn test_options_order_type_is_closed_set() {
	let validated = validate_params(
		ActionType::Options,
		&params(json!({"chainId": 1, "orderType": "LIMIT"})),
	)
	.unwrap();
	assert_eq!(
		validated.exact("orderType"),
		Some(&FilterValue::Text("limit".to_string()))
	);

	let error = validate_params(
		ActionType::Options,
		&params(json!({"chainId": 1, "orderType": "stop"})),
	)
	.unwrap_err();
	assert!(matches!(error, ValidationError::InvalidFieldType(_)));

	let error = validate_params(
		ActionType::Options,
		&params(json!({"chainId": 1, "orderType": {"op": "gt", "value": "limit"}})),
	)
	.unwrap_err();
	assert!(matches!(error, ValidationError::InvalidFieldType(_)));
}

#[test]
fn test_fields_of_other_actions_are_unknown() {
	let error = validate_params(
		ActionType::Vote,
		&params(json!({"chainId": 1, "tokenIn": "0x0000000000000000000000000000000000000001"})),
	)
	.unwrap_err();
	assert!(matches!(error, ValidationError::UnknownField(_)));
	assert!(error.to_string().contains("tokenIn"));
}
