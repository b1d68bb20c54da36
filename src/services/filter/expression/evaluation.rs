//! Evaluation of operators against observed values.
//!
//! Matching is total: an observed value of a different kind than the operator's
//! operands never matches, and no comparison can fail.

use super::{
	ast::{ComparisonOperator, FilterOperator, FilterValue},
	helpers::compare_ordered_values,
};

impl FilterOperator {
	/// Returns whether the observed value satisfies this operator.
	pub fn matches(&self, observed: &FilterValue) -> bool {
		match self {
			Self::Eq { value } => values_equal(observed, value),
			Self::Neq { value } => same_kind(observed, value) && !values_equal(observed, value),
			Self::Gt { value } => compare_uint(observed, ComparisonOperator::Gt, value),
			Self::Gte { value } => compare_uint(observed, ComparisonOperator::Gte, value),
			Self::Lt { value } => compare_uint(observed, ComparisonOperator::Lt, value),
			Self::Lte { value } => compare_uint(observed, ComparisonOperator::Lte, value),
			Self::Between { low, high } => {
				compare_uint(observed, ComparisonOperator::Gte, low)
					&& compare_uint(observed, ComparisonOperator::Lte, high)
			}
			Self::In { values } => values.iter().any(|v| values_equal(observed, v)),
		}
	}
}

/// Equality with case-insensitive string comparison. Addresses are compared as bytes.
pub fn values_equal(left: &FilterValue, right: &FilterValue) -> bool {
	match (left, right) {
		(FilterValue::Uint(l), FilterValue::Uint(r)) => l == r,
		(FilterValue::Address(l), FilterValue::Address(r)) => l == r,
		(FilterValue::Text(l), FilterValue::Text(r)) => l.to_lowercase() == r.to_lowercase(),
		_ => false,
	}
}

fn same_kind(left: &FilterValue, right: &FilterValue) -> bool {
	std::mem::discriminant(left) == std::mem::discriminant(right)
}

fn compare_uint(observed: &FilterValue, op: ComparisonOperator, operand: &FilterValue) -> bool {
	match (observed, operand) {
		(FilterValue::Uint(l), FilterValue::Uint(r)) => compare_ordered_values(l, &op, r),
		_ => {
			tracing::trace!(
				"Skipping {:?} comparison between {} and {}",
				op,
				observed.kind(),
				operand.kind()
			);
			false
		}
	}
}
