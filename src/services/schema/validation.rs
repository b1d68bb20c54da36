//! Validation of caller parameters against an action schema.
//!
//! Validation is synchronous and has no side effects besides debug logging.

use alloy::primitives::U256;
use std::collections::{BTreeMap, HashMap};

use crate::{
	models::{ActionParams, ActionType, FieldValue, ParamInput, RawOperator, ValidatedParams},
	services::{
		filter::{FieldDomain, FilterError, FilterOperator, FilterValue},
		schema::{
			error::ValidationError,
			schemas::{schema_for, ActionSchema, FieldSpec, OperatorSupport},
		},
	},
};

/// Validates parameters for `action` and coerces every present field into its domain.
///
/// JSON `null` is treated the same as an absent field.
pub fn validate_params(
	action: ActionType,
	params: &ActionParams,
) -> Result<ValidatedParams, ValidationError> {
	let schema = schema_for(action);

	for (name, _) in params.iter() {
		if schema.field(name).is_none() {
			return Err(ValidationError::unknown_field(
				format!("{} does not accept field '{}'", action, name),
				None,
				Some(field_metadata(action, name)),
			));
		}
	}

	let mut fields = BTreeMap::new();
	for spec in schema.fields {
		match params.get(spec.name) {
			None | Some(ParamInput::Literal(serde_json::Value::Null)) => {
				if spec.required {
					return Err(ValidationError::missing_required_field(
						format!("{} requires field '{}'", action, spec.name),
						None,
						Some(field_metadata(action, spec.name)),
					));
				}
			}
			Some(input) => {
				let value = coerce_field(spec, input)
					.map_err(|e| ValidationError::from_filter_error(spec.name, e))?;
				fields.insert(spec.name.to_string(), value);
			}
		}
	}

	let chain_id = concrete_chain_id(schema, schema.chain_field, &fields)?;
	let destination_chain_id = match schema.destination_chain_field {
		Some(field) => Some(concrete_chain_id(schema, field, &fields)?),
		None => None,
	};

	if let Some(destination) = destination_chain_id {
		if destination == chain_id {
			return Err(ValidationError::invalid_bridge_route(
				format!(
					"source and destination chain must differ, both are {}",
					chain_id
				),
				None,
				Some(HashMap::from([
					("source_chain_id".to_string(), chain_id.to_string()),
					("destination_chain_id".to_string(), destination.to_string()),
				])),
			));
		}
	}

	tracing::debug!(
		action = %action,
		chain_id = chain_id,
		fields = fields.len(),
		"validated action parameters"
	);

	Ok(ValidatedParams::new(
		action,
		chain_id,
		destination_chain_id,
		fields,
	))
}

fn coerce_field(spec: &FieldSpec, input: &ParamInput) -> Result<FieldValue, FilterError> {
	match input {
		ParamInput::Literal(value) => {
			FilterValue::from_json(&spec.domain, value).map(FieldValue::Exact)
		}
		ParamInput::Operator(raw) => {
			check_operator_support(spec, raw)?;
			resolve_operator(&spec.domain, raw).map(FieldValue::Operator)
		}
	}
}

fn check_operator_support(spec: &FieldSpec, raw: &RawOperator) -> Result<(), FilterError> {
	let allowed = match spec.operators {
		OperatorSupport::None => false,
		OperatorSupport::Equality => matches!(
			raw,
			RawOperator::Eq { .. } | RawOperator::Neq { .. } | RawOperator::In { .. }
		),
		OperatorSupport::Full => true,
	};

	if allowed {
		Ok(())
	} else {
		Err(FilterError::unsupported_operator(
			format!(
				"Field '{}' does not accept the '{}' operator",
				spec.name,
				raw.name()
			),
			None,
			None,
		))
	}
}

/// Types the operands of a caller-written operator and builds the checked operator.
pub fn resolve_operator(
	domain: &FieldDomain,
	raw: &RawOperator,
) -> Result<FilterOperator, FilterError> {
	let typed = |value: &serde_json::Value| FilterValue::from_json(domain, value);

	match raw {
		RawOperator::Eq { value } => FilterOperator::eq(domain, typed(value)?),
		RawOperator::Neq { value } => FilterOperator::neq(domain, typed(value)?),
		RawOperator::Gt { value } => FilterOperator::gt(domain, typed(value)?),
		RawOperator::Gte { value } => FilterOperator::gte(domain, typed(value)?),
		RawOperator::Lt { value } => FilterOperator::lt(domain, typed(value)?),
		RawOperator::Lte { value } => FilterOperator::lte(domain, typed(value)?),
		RawOperator::Between { low, high } => {
			FilterOperator::between(domain, typed(low)?, typed(high)?)
		}
		RawOperator::In { values } => FilterOperator::in_set(
			domain,
			values.iter().map(typed).collect::<Result<Vec<_>, _>>()?,
		),
	}
}

fn concrete_chain_id(
	schema: &ActionSchema,
	field: &str,
	fields: &BTreeMap<String, FieldValue>,
) -> Result<u64, ValidationError> {
	let value = match fields.get(field) {
		Some(FieldValue::Exact(FilterValue::Uint(value))) => *value,
		_ => {
			return Err(ValidationError::invalid_field_type(
				format!("'{}' must be a concrete chain id", field),
				None,
				Some(field_metadata(schema.action, field)),
			))
		}
	};

	u64::try_from(value).map_err(|_| chain_id_overflow(schema.action, field, value))
}

fn chain_id_overflow(action: ActionType, field: &str, value: U256) -> ValidationError {
	ValidationError::invalid_field_type(
		format!("chain id {} does not fit in 64 bits", value),
		None,
		Some(field_metadata(action, field)),
	)
}

fn field_metadata(action: ActionType, field: &str) -> HashMap<String, String> {
	HashMap::from([
		("action".to_string(), action.to_string()),
		("field".to_string(), field.to_string()),
	])
}
