//! Mock implementations for testing purposes.
//!
//! This module contains mock implementations of the data source traits plugins
//! are composed from. The mocks are implemented using the `mockall` crate.


#[allow(unused_imports)]
pub use services::*;
