use alloy::primitives::{Address, U256};
use proptest::prelude::*;

use action_filter_registry::services::filter::FilterValue;

pub const MAX_SET_SIZE: usize = 8;

pub fn uint_strategy() -> impl Strategy<Value = U256> {
	prop_oneof![
		// Small values collide often, which exercises equality
		(0u64..16).prop_map(U256::from),
		any::<u64>().prop_map(U256::from),
		any::<[u8; 32]>().prop_map(|bytes| U256::from_be_bytes(bytes)),
		Just(U256::MAX),
	]
}

pub fn address_strategy() -> impl Strategy<Value = Address> {
	prop_oneof![
		(0u8..4).prop_map(Address::repeat_byte),
		any::<[u8; 20]>().prop_map(Address::from),
	]
}

pub fn text_strategy() -> impl Strategy<Value = String> {
	"[a-zA-Z]{1,6}"
}

pub fn filter_value_strategy() -> impl Strategy<Value = FilterValue> {
	prop_oneof![
		uint_strategy().prop_map(FilterValue::Uint),
		address_strategy().prop_map(FilterValue::Address),
		text_strategy().prop_map(FilterValue::Text),
	]
}

/// Inclusive bounds with `low <= high`
pub fn range_strategy() -> impl Strategy<Value = (U256, U256)> {
	(uint_strategy(), uint_strategy()).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

/// Field names that no action schema declares
pub fn unknown_field_strategy() -> impl Strategy<Value = String> {
	"x[A-Z][a-z]{2,8}"
}
