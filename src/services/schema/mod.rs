//! Action parameter schemas and validation.
//!
//! Declares, per action type, the accepted fields with their domains and checks
//! caller parameters against them:
//! - Required and unknown fields
//! - Operand types and operator support per field
//! - Cross-field rules such as distinct bridge chains

mod error;
mod schemas;
mod validation;

pub use error::ValidationError;
pub use schemas::{schema_for, ActionSchema, FieldSpec, OperatorSupport};
pub use validation::{resolve_operator, validate_params};
