//! Core domain models for the action-filter engine.
//!
//! This module contains the fundamental data structures that represent:
//! - Actions: the recognized classes of on-chain user activity
//! - Parameters: caller input and its validated form
//! - Filters: the transaction matchers plugins produce

mod action;
mod filter;
mod params;

pub use action::{ActionType, OrderType};
pub use filter::{
	FieldPredicate, ObservedAction, Selector, TransactionFilter, TransactionFilterBuilder,
};
pub use params::{ActionParams, FieldValue, ParamInput, RawOperator, ValidatedParams};
