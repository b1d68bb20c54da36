//! Caller-supplied and validated action parameters.
//!
//! [`ActionParams`] is the untyped shape callers send: each field holds either a
//! concrete JSON literal or an operator object such as `{"op":"gte","value":1000}`.
//! A field missing from the map is unconstrained. Schema validation turns it into
//! [`ValidatedParams`], where every present field is coerced to its domain.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
	models::{ActionType, FieldPredicate},
	services::filter::{FilterOperator, FilterValue},
};

/// An operator object as written by the caller, before its operands are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum RawOperator {
	Eq { value: serde_json::Value },
	Neq { value: serde_json::Value },
	Gt { value: serde_json::Value },
	Gte { value: serde_json::Value },
	Lt { value: serde_json::Value },
	Lte { value: serde_json::Value },
	Between {
		low: serde_json::Value,
		high: serde_json::Value,
	},
	In { values: Vec<serde_json::Value> },
}

impl RawOperator {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Eq { .. } => "eq",
			Self::Neq { .. } => "neq",
			Self::Gt { .. } => "gt",
			Self::Gte { .. } => "gte",
			Self::Lt { .. } => "lt",
			Self::Lte { .. } => "lte",
			Self::Between { .. } => "between",
			Self::In { .. } => "in",
		}
	}
}

/// Value of one caller-supplied field.
///
/// Objects carrying an `op` key are read as operators; anything else is a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamInput {
	Operator(RawOperator),
	Literal(serde_json::Value),
}

impl From<RawOperator> for ParamInput {
	fn from(op: RawOperator) -> Self {
		Self::Operator(op)
	}
}

impl From<serde_json::Value> for ParamInput {
	fn from(value: serde_json::Value) -> Self {
		Self::Literal(value)
	}
}

/// Caller-supplied parameters for one action, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionParams(BTreeMap<String, ParamInput>);

impl ActionParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a field, returning the updated parameters.
	pub fn with(mut self, field: impl Into<String>, input: impl Into<ParamInput>) -> Self {
		self.0.insert(field.into(), input.into());
		self
	}

	pub fn insert(&mut self, field: impl Into<String>, input: impl Into<ParamInput>) {
		self.0.insert(field.into(), input.into());
	}

	pub fn get(&self, field: &str) -> Option<&ParamInput> {
		self.0.get(field)
	}

	pub fn contains(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	/// Fields in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamInput)> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<K: Into<String>, V: Into<ParamInput>> FromIterator<(K, V)> for ActionParams {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}
}

/// A present field after coercion into its domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
	Exact(FilterValue),
	Operator(FilterOperator),
}

impl FieldValue {
	/// The predicate a builder should attach for this field.
	pub fn to_predicate(&self) -> FieldPredicate {
		match self {
			Self::Exact(value) => FieldPredicate::Exact(value.clone()),
			Self::Operator(op) => FieldPredicate::Operator(op.clone()),
		}
	}
}

/// Parameters that passed schema validation for a single action.
///
/// Chain ids are always concrete. For bridges `chain_id` is the source chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParams {
	action: ActionType,
	chain_id: u64,
	destination_chain_id: Option<u64>,
	fields: BTreeMap<String, FieldValue>,
}

impl ValidatedParams {
	pub fn new(
		action: ActionType,
		chain_id: u64,
		destination_chain_id: Option<u64>,
		fields: BTreeMap<String, FieldValue>,
	) -> Self {
		Self {
			action,
			chain_id,
			destination_chain_id,
			fields,
		}
	}

	pub fn action(&self) -> ActionType {
		self.action
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn destination_chain_id(&self) -> Option<u64> {
		self.destination_chain_id
	}

	pub fn get(&self, field: &str) -> Option<&FieldValue> {
		self.fields.get(field)
	}

	/// The concrete value of a field, if it was given as a literal.
	pub fn exact(&self, field: &str) -> Option<&FilterValue> {
		match self.fields.get(field) {
			Some(FieldValue::Exact(value)) => Some(value),
			_ => None,
		}
	}

	pub fn address(&self, field: &str) -> Option<Address> {
		self.exact(field).and_then(FilterValue::as_address).copied()
	}

	pub fn uint(&self, field: &str) -> Option<U256> {
		self.exact(field).and_then(FilterValue::as_uint).copied()
	}

	/// Predicate for a field; absent fields are unconstrained.
	pub fn predicate(&self, field: &str) -> FieldPredicate {
		self.fields
			.get(field)
			.map(FieldValue::to_predicate)
			.unwrap_or(FieldPredicate::Any)
	}

	pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
		self.fields.iter()
	}
}
