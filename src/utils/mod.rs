//! Utility modules for common functionality.
//!
//! - logging: Logging setup and error context utilities
//! - metrics: Prometheus metrics for dispatching and the capability cache
//! - tests: Test builders shared by unit and integration tests

pub mod logging;
pub mod metrics;
