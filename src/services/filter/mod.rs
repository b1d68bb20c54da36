//! Predicate and filter model.
//!
//! Implements the comparison primitives used to describe and recognize actions:
//! - Typed operands and field domains
//! - Domain-checked operator constructors
//! - Total, side-effect free matching

mod error;
mod expression;

pub use error::FilterError;
pub use expression::{
	compare_ordered_values, normalize_signature, string_to_u256, values_equal, ComparisonOperator,
	FieldDomain, FilterOperator, FilterValue,
};
