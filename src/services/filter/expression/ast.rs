//! Operand, domain and operator types shared by parameters and filters.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::{
	collections::{HashMap, HashSet},
	fmt,
	str::FromStr,
};

use crate::services::filter::{error::FilterError, expression::helpers::string_to_u256};

/// Value domain of an action parameter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDomain {
	/// Chain identifier, must fit in a `u64`
	ChainId,
	/// Unsigned integer up to 256 bits
	Uint,
	/// 20-byte account or contract address
	Address,
	/// One of a closed set of lower-case strings
	Enum(&'static [&'static str]),
	/// Free-form string
	Text,
	/// Either an address or, when the value does not parse as one, free-form text
	AddressOrText,
}

impl FieldDomain {
	/// Whether ordering operators (`gt`, `lte`, `between`, ...) apply to this domain.
	pub fn is_ordered(&self) -> bool {
		matches!(self, Self::ChainId | Self::Uint)
	}

	/// Whether a typed value belongs to this domain.
	pub fn admits(&self, value: &FilterValue) -> bool {
		match (self, value) {
			(Self::ChainId, FilterValue::Uint(v)) => v.bit_len() <= 64,
			(Self::Uint, FilterValue::Uint(_)) => true,
			(Self::Address, FilterValue::Address(_)) => true,
			(Self::Enum(variants), FilterValue::Text(s)) => {
				variants.iter().any(|v| v.eq_ignore_ascii_case(s))
			}
			(Self::Text, FilterValue::Text(_)) => true,
			(Self::AddressOrText, FilterValue::Address(_) | FilterValue::Text(_)) => true,
			_ => false,
		}
	}
}

impl fmt::Display for FieldDomain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ChainId => write!(f, "chain id"),
			Self::Uint => write!(f, "uint"),
			Self::Address => write!(f, "address"),
			Self::Enum(variants) => write!(f, "enum({})", variants.join("|")),
			Self::Text => write!(f, "string"),
			Self::AddressOrText => write!(f, "address or string"),
		}
	}
}

/// A typed operand.
///
/// Addresses are stored as parsed bytes, so two spellings of the same address
/// (checksummed, lower-case, upper-case) compare equal. Enumerated strings are
/// stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
	Uint(U256),
	Address(Address),
	Text(String),
}

impl FilterValue {
	/// Coerces an untyped JSON literal into the given domain.
	///
	/// Numbers are accepted as JSON integers, decimal strings or `0x` hex strings.
	/// Addresses must be 20-byte hex strings, with or without the `0x` prefix.
	pub fn from_json(domain: &FieldDomain, value: &serde_json::Value) -> Result<Self, FilterError> {
		let mismatch = |reason: String| {
			FilterError::type_mismatch(
				reason,
				None,
				Some(HashMap::from([
					("domain".to_string(), domain.to_string()),
					("value".to_string(), value.to_string()),
				])),
			)
		};

		match domain {
			FieldDomain::ChainId | FieldDomain::Uint => {
				let parsed = match value {
					serde_json::Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(|| {
						mismatch(format!("Expected an unsigned integer, found {}", n))
					})?,
					serde_json::Value::String(s) => string_to_u256(s).map_err(mismatch)?,
					_ => return Err(mismatch(format!("Expected a number, found {}", value))),
				};
				let parsed = FilterValue::Uint(parsed);
				if !domain.admits(&parsed) {
					return Err(mismatch(format!("Value {} does not fit in a chain id", parsed)));
				}
				Ok(parsed)
			}
			FieldDomain::Address => match value {
				serde_json::Value::String(s) => Address::from_str(s.trim())
					.map(FilterValue::Address)
					.map_err(|e| mismatch(format!("Invalid address '{}': {}", s, e))),
				_ => Err(mismatch(format!("Expected an address string, found {}", value))),
			},
			FieldDomain::Enum(variants) => match value {
				serde_json::Value::String(s) => {
					let candidate = FilterValue::Text(s.to_lowercase());
					if domain.admits(&candidate) {
						Ok(candidate)
					} else {
						Err(mismatch(format!(
							"'{}' is not one of {}",
							s,
							variants.join(", ")
						)))
					}
				}
				_ => Err(mismatch(format!("Expected a string, found {}", value))),
			},
			FieldDomain::Text => match value {
				serde_json::Value::String(s) => Ok(FilterValue::Text(s.clone())),
				_ => Err(mismatch(format!("Expected a string, found {}", value))),
			},
			FieldDomain::AddressOrText => match value {
				serde_json::Value::String(s) => Ok(Address::from_str(s.trim())
					.map(FilterValue::Address)
					.unwrap_or_else(|_| FilterValue::Text(s.clone()))),
				_ => Err(mismatch(format!(
					"Expected an address or a string, found {}",
					value
				))),
			},
		}
	}

	pub fn as_uint(&self) -> Option<&U256> {
		match self {
			Self::Uint(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_address(&self) -> Option<&Address> {
		match self {
			Self::Address(a) => Some(a),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	/// Short name of the value kind, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Uint(_) => "uint",
			Self::Address(_) => "address",
			Self::Text(_) => "string",
		}
	}
}

impl fmt::Display for FilterValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Uint(v) => write!(f, "{}", v),
			Self::Address(a) => write!(f, "{}", a),
			Self::Text(s) => write!(f, "{}", s),
		}
	}
}

impl From<U256> for FilterValue {
	fn from(value: U256) -> Self {
		Self::Uint(value)
	}
}

impl From<u64> for FilterValue {
	fn from(value: u64) -> Self {
		Self::Uint(U256::from(value))
	}
}

impl From<Address> for FilterValue {
	fn from(value: Address) -> Self {
		Self::Address(value)
	}
}

/// Binary comparison between an observed value and an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
	Eq,
	Ne,
	Gt,
	Gte,
	Lt,
	Lte,
}

impl ComparisonOperator {
	pub fn is_ordering(&self) -> bool {
		!matches!(self, Self::Eq | Self::Ne)
	}
}

/// A comparison predicate over a single field.
///
/// Built through the domain-checked constructors. Deserialized operators go
/// through [`FilterOperator::check`], and so do operators placed in a
/// [`TransactionFilter`](crate::models::TransactionFilter).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase", try_from = "WireOperator")]
pub enum FilterOperator {
	Eq { value: FilterValue },
	Neq { value: FilterValue },
	Gt { value: FilterValue },
	Gte { value: FilterValue },
	Lt { value: FilterValue },
	Lte { value: FilterValue },
	Between { low: FilterValue, high: FilterValue },
	In { values: Vec<FilterValue> },
}

impl FilterOperator {
	pub fn eq(domain: &FieldDomain, value: FilterValue) -> Result<Self, FilterError> {
		Self::compare(domain, ComparisonOperator::Eq, value)
	}

	pub fn neq(domain: &FieldDomain, value: FilterValue) -> Result<Self, FilterError> {
		Self::compare(domain, ComparisonOperator::Ne, value)
	}

	pub fn gt(domain: &FieldDomain, value: FilterValue) -> Result<Self, FilterError> {
		Self::compare(domain, ComparisonOperator::Gt, value)
	}

	pub fn gte(domain: &FieldDomain, value: FilterValue) -> Result<Self, FilterError> {
		Self::compare(domain, ComparisonOperator::Gte, value)
	}

	pub fn lt(domain: &FieldDomain, value: FilterValue) -> Result<Self, FilterError> {
		Self::compare(domain, ComparisonOperator::Lt, value)
	}

	pub fn lte(domain: &FieldDomain, value: FilterValue) -> Result<Self, FilterError> {
		Self::compare(domain, ComparisonOperator::Lte, value)
	}

	/// Builds a single-operand comparison after checking the operand and operator
	/// against the domain.
	pub fn compare(
		domain: &FieldDomain,
		op: ComparisonOperator,
		value: FilterValue,
	) -> Result<Self, FilterError> {
		if op.is_ordering() && !domain.is_ordered() {
			return Err(FilterError::unsupported_operator(
				format!("Operator {:?} is not supported for {} fields", op, domain),
				None,
				None,
			));
		}
		check_operand(domain, &value)?;

		Ok(match op {
			ComparisonOperator::Eq => Self::Eq { value },
			ComparisonOperator::Ne => Self::Neq { value },
			ComparisonOperator::Gt => Self::Gt { value },
			ComparisonOperator::Gte => Self::Gte { value },
			ComparisonOperator::Lt => Self::Lt { value },
			ComparisonOperator::Lte => Self::Lte { value },
		})
	}

	/// Inclusive range. Fails with [`FilterError::InvalidRange`] when `low > high`.
	pub fn between(
		domain: &FieldDomain,
		low: FilterValue,
		high: FilterValue,
	) -> Result<Self, FilterError> {
		if !domain.is_ordered() {
			return Err(FilterError::unsupported_operator(
				format!("Operator Between is not supported for {} fields", domain),
				None,
				None,
			));
		}
		check_operand(domain, &low)?;
		check_operand(domain, &high)?;

		if let (FilterValue::Uint(l), FilterValue::Uint(h)) = (&low, &high) {
			if l > h {
				return Err(inverted_range(l, h));
			}
		}

		Ok(Self::Between { low, high })
	}

	/// Set membership. The set must not be empty.
	pub fn in_set(domain: &FieldDomain, values: Vec<FilterValue>) -> Result<Self, FilterError> {
		if values.is_empty() {
			return Err(FilterError::type_mismatch(
				"Set membership requires at least one value",
				None,
				None,
			));
		}
		for value in &values {
			check_operand(domain, value)?;
		}

		let mut seen = HashSet::new();
		let mut values = values;
		values.retain(|v| seen.insert(v.clone()));

		Ok(Self::In { values })
	}

	/// Operator name as it appears in serialized form.
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

	/// Re-checks what the constructors guarantee, without a field domain:
	/// ordering operators and ranges take unsigned integers, a range is not
	/// inverted, and a set is non-empty and does not mix integers with other
	/// kinds.
	pub fn check(&self) -> Result<(), FilterError> {
		match self {
			Self::Eq { .. } | Self::Neq { .. } => Ok(()),
			Self::Gt { value } | Self::Gte { value } | Self::Lt { value } | Self::Lte { value } => {
				require_uint(self.name(), value).map(|_| ())
			}
			Self::Between { low, high } => {
				let low = require_uint("between", low)?;
				let high = require_uint("between", high)?;
				if low > high {
					return Err(inverted_range(low, high));
				}
				Ok(())
			}
			Self::In { values } => {
				let uints = values.iter().filter(|v| v.as_uint().is_some()).count();
				if values.is_empty() {
					Err(FilterError::type_mismatch(
						"Set membership requires at least one value",
						None,
						None,
					))
				} else if uints != 0 && uints != values.len() {
					Err(FilterError::type_mismatch(
						"Set mixes integers with other kinds of values",
						None,
						Some(HashMap::from([(
							"values".to_string(),
							values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","),
						)])),
					))
				} else {
					Ok(())
				}
			}
		}
	}
}

/// Serialized form of [`FilterOperator`]
#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum WireOperator {
	Eq { value: FilterValue },
	Neq { value: FilterValue },
	Gt { value: FilterValue },
	Gte { value: FilterValue },
	Lt { value: FilterValue },
	Lte { value: FilterValue },
	Between { low: FilterValue, high: FilterValue },
	In { values: Vec<FilterValue> },
}

impl TryFrom<WireOperator> for FilterOperator {
	type Error = FilterError;

	fn try_from(wire: WireOperator) -> Result<Self, Self::Error> {
		let operator = match wire {
			WireOperator::Eq { value } => Self::Eq { value },
			WireOperator::Neq { value } => Self::Neq { value },
			WireOperator::Gt { value } => Self::Gt { value },
			WireOperator::Gte { value } => Self::Gte { value },
			WireOperator::Lt { value } => Self::Lt { value },
			WireOperator::Lte { value } => Self::Lte { value },
			WireOperator::Between { low, high } => Self::Between { low, high },
			WireOperator::In { mut values } => {
				let mut seen = HashSet::new();
				values.retain(|v| seen.insert(v.clone()));
				Self::In { values }
			}
		};
		operator.check()?;
		Ok(operator)
	}
}

fn require_uint<'a>(op: &str, value: &'a FilterValue) -> Result<&'a U256, FilterError> {
	value.as_uint().ok_or_else(|| {
		FilterError::unsupported_operator(
			format!("Operator {} requires an unsigned integer, found {}", op, value.kind()),
			None,
			None,
		)
	})
}

fn inverted_range(low: &U256, high: &U256) -> FilterError {
	FilterError::invalid_range(
		format!("Lower bound {} is greater than upper bound {}", low, high),
		None,
		Some(HashMap::from([
			("low".to_string(), low.to_string()),
			("high".to_string(), high.to_string()),
		])),
	)
}

fn check_operand(domain: &FieldDomain, value: &FilterValue) -> Result<(), FilterError> {
	if domain.admits(value) {
		Ok(())
	} else {
		Err(FilterError::type_mismatch(
			format!(
				"Operand {} ({}) does not belong to the {} domain",
				value,
				value.kind(),
				domain
			),
			None,
			None,
		))
	}
}
