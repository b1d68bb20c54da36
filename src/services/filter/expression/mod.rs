//! Shared logic for typed operands, operators and their evaluation

mod ast;
mod evaluation;
mod helpers;

pub use ast::{ComparisonOperator, FieldDomain, FilterOperator, FilterValue};
pub use evaluation::values_equal;
pub use helpers::{compare_ordered_values, normalize_signature, string_to_u256};
