//! Property-based tests for operator semantics.
//!
//! Tests cover range membership, set membership, equality complements and the
//! rule that values of different kinds never match.

use crate::properties::strategies::{
	address_strategy, filter_value_strategy, range_strategy, uint_strategy, MAX_SET_SIZE,
};
use action_filter_registry::services::filter::{
	values_equal, FieldDomain, FilterError, FilterOperator, FilterValue,
};
use proptest::{prelude::*, test_runner::Config};

fn domain_of(value: &FilterValue) -> FieldDomain {
	match value {
		FilterValue::Uint(_) => FieldDomain::Uint,
		FilterValue::Address(_) => FieldDomain::Address,
		FilterValue::Text(_) => FieldDomain::Text,
	}
}

fn same_kind(a: &FilterValue, b: &FilterValue) -> bool {
	std::mem::discriminant(a) == std::mem::discriminant(b)
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_between_matches_iff_within_bounds(
		(low, high) in range_strategy(),
		observed in uint_strategy(),
	) {
		let op = FilterOperator::between(
			&FieldDomain::Uint,
			FilterValue::Uint(low),
			FilterValue::Uint(high),
		).unwrap();

		prop_assert_eq!(
			op.matches(&FilterValue::Uint(observed)),
			low <= observed && observed <= high
		);
		prop_assert!(op.matches(&FilterValue::Uint(low)));
		prop_assert!(op.matches(&FilterValue::Uint(high)));
	}

	#[test]
	fn test_inverted_between_is_invalid_range(
		(low, high) in range_strategy(),
	) {
		prop_assume!(low != high);
		let result = FilterOperator::between(
			&FieldDomain::Uint,
			FilterValue::Uint(high),
			FilterValue::Uint(low),
		);
		prop_assert!(matches!(result, Err(FilterError::InvalidRange(_))));
	}

	#[test]
	fn test_in_set_matches_iff_member(
		members in prop::collection::vec(address_strategy(), 1..MAX_SET_SIZE),
		observed in address_strategy(),
	) {
		let op = FilterOperator::in_set(
			&FieldDomain::Address,
			members.iter().copied().map(FilterValue::Address).collect(),
		).unwrap();

		prop_assert_eq!(
			op.matches(&FilterValue::Address(observed)),
			members.contains(&observed)
		);
		for member in &members {
			prop_assert!(op.matches(&FilterValue::Address(*member)));
		}
	}

	#[test]
	fn test_eq_and_neq_are_complementary_within_a_kind(
		operand in filter_value_strategy(),
		observed in filter_value_strategy(),
	) {
		let domain = domain_of(&operand);
		let eq = FilterOperator::eq(&domain, operand.clone()).unwrap();
		let neq = FilterOperator::neq(&domain, operand.clone()).unwrap();

		if same_kind(&operand, &observed) {
			prop_assert_ne!(eq.matches(&observed), neq.matches(&observed));
			prop_assert_eq!(eq.matches(&observed), values_equal(&observed, &operand));
		} else {
			prop_assert!(!eq.matches(&observed));
			prop_assert!(!neq.matches(&observed));
		}
	}

	#[test]
	fn test_ordering_operators_agree_with_integer_order(
		operand in uint_strategy(),
		observed in uint_strategy(),
	) {
		let domain = FieldDomain::Uint;
		let value = FilterValue::Uint(observed);
		let gt = FilterOperator::gt(&domain, FilterValue::Uint(operand)).unwrap();
		let gte = FilterOperator::gte(&domain, FilterValue::Uint(operand)).unwrap();
		let lt = FilterOperator::lt(&domain, FilterValue::Uint(operand)).unwrap();
		let lte = FilterOperator::lte(&domain, FilterValue::Uint(operand)).unwrap();

		prop_assert_eq!(gt.matches(&value), observed > operand);
		prop_assert_eq!(gte.matches(&value), observed >= operand);
		prop_assert_eq!(lt.matches(&value), observed < operand);
		prop_assert_eq!(lte.matches(&value), observed <= operand);
		// Exactly one of <, == and > holds
		prop_assert_eq!(
			[lt.matches(&value), gt.matches(&value), observed == operand]
				.iter()
				.filter(|b| **b)
				.count(),
			1
		);
	}

	#[test]
	fn test_ordering_operators_never_match_other_kinds(
		operand in uint_strategy(),
		observed in address_strategy(),
	) {
		let op = FilterOperator::gte(&FieldDomain::Uint, FilterValue::Uint(operand)).unwrap();
		prop_assert!(!op.matches(&FilterValue::Address(observed)));
	}

	#[test]
	fn test_text_equality_ignores_case(text in "[a-zA-Z]{1,12}") {
		let op = FilterOperator::eq(&FieldDomain::Text, FilterValue::Text(text.clone())).unwrap();
		prop_assert!(op.matches(&FilterValue::Text(text.to_uppercase())));
		prop_assert!(op.matches(&FilterValue::Text(text.to_lowercase())));
	}
}
