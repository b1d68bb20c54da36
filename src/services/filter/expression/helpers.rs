//! Utility functions for parsing operands and comparing values

use alloy::primitives::U256;
use std::str::FromStr;

use super::ast::ComparisonOperator;

/// Compares two values implementing the Ord trait using the specified comparison operator
pub fn compare_ordered_values<T: Ord>(left: &T, op: &ComparisonOperator, right: &T) -> bool {
	match op {
		ComparisonOperator::Eq => left == right,
		ComparisonOperator::Ne => left != right,
		ComparisonOperator::Gt => left > right,
		ComparisonOperator::Gte => left >= right,
		ComparisonOperator::Lt => left < right,
		ComparisonOperator::Lte => left <= right,
	}
}

/// Converts a decimal or `0x`-prefixed hexadecimal string to a U256 value.
pub fn string_to_u256(value_str: &str) -> Result<U256, String> {
	let trimmed = value_str.trim();

	if trimmed.is_empty() {
		return Err("Input string is empty".to_string());
	}

	if let Some(hex_val) = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
	{
		if hex_val.is_empty() {
			return Err("Hex string '0x' is missing value digits".to_string());
		}
		U256::from_str_radix(hex_val, 16)
			.map_err(|e| format!("Failed to parse hex '{}': {}", hex_val, e))
	} else {
		U256::from_str(trimmed).map_err(|e| format!("Failed to parse decimal '{}': {}", trimmed, e))
	}
}

/// Normalizes a function or event signature by removing whitespace.
///
/// Case is preserved: selectors are hashed over the exact canonical signature.
pub fn normalize_signature(signature: &str) -> String {
	signature.chars().filter(|c| !c.is_whitespace()).collect()
}
