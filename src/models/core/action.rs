use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Recognized class of on-chain user activity
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
	Bridge,
	Stake,
	Swap,
	Mint,
	Burn,
	Quest,
	Delegate,
	Options,
	Vote,
}

impl ActionType {
	/// Every action type, in declaration order
	pub const ALL: [ActionType; 9] = [
		ActionType::Bridge,
		ActionType::Stake,
		ActionType::Swap,
		ActionType::Mint,
		ActionType::Burn,
		ActionType::Quest,
		ActionType::Delegate,
		ActionType::Options,
		ActionType::Vote,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Bridge => "bridge",
			Self::Stake => "stake",
			Self::Swap => "swap",
			Self::Mint => "mint",
			Self::Burn => "burn",
			Self::Quest => "quest",
			Self::Delegate => "delegate",
			Self::Options => "options",
			Self::Vote => "vote",
		}
	}
}

impl fmt::Display for ActionType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for ActionType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
			.copied()
			.ok_or_else(|| format!("Unknown action type: {}", s))
	}
}

/// Order kind of an options trade
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
	Limit,
	Market,
}

impl OrderType {
	/// Accepted spellings, used as the domain of the `orderType` field
	pub const VARIANTS: &'static [&'static str] = &["limit", "market"];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Limit => "limit",
			Self::Market => "market",
		}
	}
}
