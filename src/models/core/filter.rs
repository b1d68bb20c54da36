//! Transaction-matching descriptors produced by action plugins.

use alloy::primitives::{keccak256, Address, Bytes, FixedBytes, B256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::services::filter::{
	normalize_signature, values_equal, FilterError, FilterOperator, FilterValue,
};

/// Constraint on a single decoded field of a matching transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPredicate {
	/// Unconstrained
	#[default]
	Any,
	Exact(FilterValue),
	Operator(FilterOperator),
}

impl FieldPredicate {
	/// Evaluates the predicate against an observed field. A missing field only
	/// satisfies `Any`.
	pub fn matches(&self, observed: Option<&FilterValue>) -> bool {
		match self {
			Self::Any => true,
			Self::Exact(expected) => observed.is_some_and(|v| values_equal(v, expected)),
			Self::Operator(op) => observed.is_some_and(|v| op.matches(v)),
		}
	}

	pub fn is_any(&self) -> bool {
		matches!(self, Self::Any)
	}
}

/// Function selector or event topic a filter is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
	Function {
		signature: String,
		selector: FixedBytes<4>,
	},
	Event {
		signature: String,
		topic0: B256,
	},
}

impl Selector {
	/// Function selector: first four bytes of the keccak-256 hash of the signature.
	pub fn function(signature: &str) -> Self {
		let signature = normalize_signature(signature);
		let hash = keccak256(signature.as_bytes());
		Self::Function {
			selector: FixedBytes::from_slice(&hash[..4]),
			signature,
		}
	}

	/// Event topic: keccak-256 hash of the signature.
	pub fn event(signature: &str) -> Self {
		let signature = normalize_signature(signature);
		Self::Event {
			topic0: keccak256(signature.as_bytes()),
			signature,
		}
	}

	pub fn signature(&self) -> &str {
		match self {
			Self::Function { signature, .. } | Self::Event { signature, .. } => signature,
		}
	}

	/// Checks raw bytes from an observed transaction: calldata (prefix match) for
	/// functions, `topic0` for events.
	pub fn matches_raw(&self, raw: &[u8]) -> bool {
		match self {
			Self::Function { selector, .. } => raw.len() >= 4 && raw[..4] == selector[..],
			Self::Event { topic0, .. } => raw == topic0.as_slice(),
		}
	}
}

/// Matcher descriptor for transactions realizing one action on one chain.
///
/// Only produced by [`TransactionFilterBuilder::build`], deserialization included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireFilter")]
pub struct TransactionFilter {
	chain_id: u64,
	/// Sorted, without duplicates, never empty
	contracts: Vec<Address>,
	selector: Selector,
	predicates: BTreeMap<String, FieldPredicate>,
}

/// Serialized form of [`TransactionFilter`]
#[derive(Deserialize)]
struct WireFilter {
	chain_id: u64,
	contracts: Vec<Address>,
	selector: Selector,
	predicates: BTreeMap<String, FieldPredicate>,
}

impl TryFrom<WireFilter> for TransactionFilter {
	type Error = FilterError;

	fn try_from(wire: WireFilter) -> Result<Self, Self::Error> {
		TransactionFilterBuilder {
			chain_id: wire.chain_id,
			selector: wire.selector,
			contracts: wire.contracts,
			predicates: wire.predicates,
		}
		.build()
	}
}

impl TransactionFilter {
	pub fn builder(chain_id: u64, selector: Selector) -> TransactionFilterBuilder {
		TransactionFilterBuilder {
			chain_id,
			selector,
			contracts: Vec::new(),
			predicates: BTreeMap::new(),
		}
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Contract addresses in ascending order.
	pub fn contracts(&self) -> &[Address] {
		&self.contracts
	}

	pub fn selector(&self) -> &Selector {
		&self.selector
	}

	pub fn predicates(&self) -> &BTreeMap<String, FieldPredicate> {
		&self.predicates
	}

	/// Whether the observed action satisfies chain, contract, selector and every
	/// field predicate.
	pub fn matches(&self, observed: &ObservedAction) -> bool {
		observed.chain_id == self.chain_id
			&& self.contracts.binary_search(&observed.contract).is_ok()
			&& self.selector.matches_raw(&observed.selector)
			&& self
				.predicates
				.iter()
				.all(|(field, predicate)| predicate.matches(observed.fields.get(field)))
	}

	pub fn predicate(&self, field: &str) -> Option<&FieldPredicate> {
		self.predicates.get(field)
	}
}

/// Incremental construction of a [`TransactionFilter`].
#[derive(Debug, Clone)]
pub struct TransactionFilterBuilder {
	chain_id: u64,
	selector: Selector,
	contracts: Vec<Address>,
	predicates: BTreeMap<String, FieldPredicate>,
}

impl TransactionFilterBuilder {
	pub fn contract(mut self, address: Address) -> Self {
		self.contracts.push(address);
		self
	}

	pub fn contracts(mut self, addresses: impl IntoIterator<Item = Address>) -> Self {
		self.contracts.extend(addresses);
		self
	}

	pub fn predicate(mut self, field: impl Into<String>, predicate: FieldPredicate) -> Self {
		self.predicates.insert(field.into(), predicate);
		self
	}

	pub fn build(mut self) -> Result<TransactionFilter, FilterError> {
		if self.contracts.is_empty() {
			return Err(FilterError::invalid_filter(
				"A transaction filter needs at least one contract address",
				None,
				Some(HashMap::from([
					("chain_id".to_string(), self.chain_id.to_string()),
					(
						"signature".to_string(),
						self.selector.signature().to_string(),
					),
				])),
			));
		}
		for (field, predicate) in &self.predicates {
			if let FieldPredicate::Operator(op) = predicate {
				op.check().map_err(|e| {
					FilterError::invalid_filter(
						format!("Predicate on '{}' is not valid", field),
						Some(Box::new(e)),
						Some(HashMap::from([("field".to_string(), field.clone())])),
					)
				})?;
			}
		}
		self.contracts.sort_unstable();
		self.contracts.dedup();

		Ok(TransactionFilter {
			chain_id: self.chain_id,
			contracts: self.contracts,
			selector: self.selector,
			predicates: self.predicates,
		})
	}
}

/// A decoded on-chain call or event, as seen by a consumer of filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservedAction {
	pub chain_id: u64,
	pub contract: Address,
	/// Calldata for function calls, `topic0` for events
	pub selector: Bytes,
	pub fields: HashMap<String, FilterValue>,
}
