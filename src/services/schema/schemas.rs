//! Per-action parameter schemas.
//!
//! Each action declares its fields, which of them are required, the value domain
//! of each field and which operators a field accepts.

use crate::{
	models::{ActionType, OrderType},
	services::filter::FieldDomain,
};

/// Operators a field accepts in addition to concrete values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorSupport {
	/// Concrete values only
	None,
	/// `eq`, `neq` and `in`
	Equality,
	/// Every operator, including ordering and ranges
	Full,
}

/// Declaration of one parameter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
	pub name: &'static str,
	pub domain: FieldDomain,
	pub required: bool,
	pub operators: OperatorSupport,
}

impl FieldSpec {
	const fn chain(name: &'static str) -> Self {
		Self {
			name,
			domain: FieldDomain::ChainId,
			required: true,
			operators: OperatorSupport::None,
		}
	}

	const fn address(name: &'static str) -> Self {
		Self {
			name,
			domain: FieldDomain::Address,
			required: false,
			operators: OperatorSupport::Equality,
		}
	}

	const fn amount(name: &'static str) -> Self {
		Self {
			name,
			domain: FieldDomain::Uint,
			required: false,
			operators: OperatorSupport::Full,
		}
	}

	const fn required(mut self) -> Self {
		self.required = true;
		self
	}
}

/// Schema of one action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSchema {
	pub action: ActionType,
	pub fields: &'static [FieldSpec],
	/// Field holding the (source) chain id
	pub chain_field: &'static str,
	/// Field holding the destination chain id, bridges only
	pub destination_chain_field: Option<&'static str>,
	/// Field used to narrow candidates by supported token
	pub token_field: Option<&'static str>,
}

impl ActionSchema {
	pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
		self.fields.iter().find(|spec| spec.name == name)
	}

	pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
		self.fields
			.iter()
			.filter(|spec| spec.required)
			.map(|spec| spec.name)
	}
}

const SWAP_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("chainId"),
	FieldSpec::address("contractAddress"),
	FieldSpec::address("tokenIn"),
	FieldSpec::address("tokenOut"),
	FieldSpec::address("recipient"),
	FieldSpec::amount("amountIn"),
	FieldSpec::amount("amountOut"),
	FieldSpec::amount("deadline"),
];

const OPTIONS_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("chainId"),
	FieldSpec::address("contractAddress"),
	FieldSpec::address("token"),
	FieldSpec::address("recipient"),
	FieldSpec::amount("amount"),
	FieldSpec {
		name: "orderType",
		domain: FieldDomain::Enum(OrderType::VARIANTS),
		required: false,
		operators: OperatorSupport::Equality,
	},
];

const STAKE_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("chainId"),
	FieldSpec::address("contractAddress"),
	FieldSpec::address("tokenOne"),
	FieldSpec::address("tokenTwo"),
	FieldSpec::amount("amountOne"),
	FieldSpec::amount("amountTwo"),
	FieldSpec::amount("duration"),
];

const BRIDGE_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("sourceChainId"),
	FieldSpec::chain("destinationChainId"),
	FieldSpec::address("contractAddress"),
	FieldSpec::address("tokenAddress"),
	FieldSpec::address("recipient"),
	FieldSpec::amount("amount"),
];

const TOKEN_SUPPLY_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("chainId"),
	FieldSpec::address("contractAddress").required(),
	FieldSpec {
		name: "tokenId",
		domain: FieldDomain::Uint,
		required: false,
		operators: OperatorSupport::None,
	},
	FieldSpec::amount("amount"),
	FieldSpec::address("recipient"),
];

const QUEST_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("chainId"),
	FieldSpec::address("rewardToken"),
	FieldSpec::amount("rewardAmount"),
	FieldSpec::amount("startTime"),
	FieldSpec::amount("endTime"),
	FieldSpec::amount("totalParticipants"),
	FieldSpec {
		name: "actionSpec",
		domain: FieldDomain::Text,
		required: false,
		operators: OperatorSupport::Equality,
	},
];

const DELEGATE_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("chainId"),
	FieldSpec {
		name: "project",
		domain: FieldDomain::AddressOrText,
		required: true,
		operators: OperatorSupport::Equality,
	},
	FieldSpec::address("delegate"),
	FieldSpec::address("delegator"),
	FieldSpec::address("contractAddress"),
	FieldSpec::amount("amount"),
];

const VOTE_FIELDS: &[FieldSpec] = &[
	FieldSpec::chain("chainId"),
	FieldSpec::address("governorAddress"),
	FieldSpec::amount("proposalId"),
	FieldSpec::amount("weight"),
];

const fn single_chain(
	action: ActionType,
	fields: &'static [FieldSpec],
	token_field: Option<&'static str>,
) -> ActionSchema {
	ActionSchema {
		action,
		fields,
		chain_field: "chainId",
		destination_chain_field: None,
		token_field,
	}
}

static SWAP: ActionSchema = single_chain(ActionType::Swap, SWAP_FIELDS, Some("tokenIn"));
static OPTIONS: ActionSchema = single_chain(ActionType::Options, OPTIONS_FIELDS, Some("token"));
static STAKE: ActionSchema = single_chain(ActionType::Stake, STAKE_FIELDS, Some("tokenOne"));
static MINT: ActionSchema = single_chain(ActionType::Mint, TOKEN_SUPPLY_FIELDS, None);
static BURN: ActionSchema = single_chain(ActionType::Burn, TOKEN_SUPPLY_FIELDS, None);
static QUEST: ActionSchema = single_chain(ActionType::Quest, QUEST_FIELDS, Some("rewardToken"));
static DELEGATE: ActionSchema = single_chain(ActionType::Delegate, DELEGATE_FIELDS, None);
static VOTE: ActionSchema = single_chain(ActionType::Vote, VOTE_FIELDS, None);
static BRIDGE: ActionSchema = ActionSchema {
	action: ActionType::Bridge,
	fields: BRIDGE_FIELDS,
	chain_field: "sourceChainId",
	destination_chain_field: Some("destinationChainId"),
	token_field: Some("tokenAddress"),
};

/// Returns the schema of an action type.
pub fn schema_for(action: ActionType) -> &'static ActionSchema {
	match action {
		ActionType::Swap => &SWAP,
		ActionType::Options => &OPTIONS,
		ActionType::Stake => &STAKE,
		ActionType::Bridge => &BRIDGE,
		ActionType::Mint => &MINT,
		ActionType::Burn => &BURN,
		ActionType::Quest => &QUEST,
		ActionType::Delegate => &DELEGATE,
		ActionType::Vote => &VOTE,
	}
}
