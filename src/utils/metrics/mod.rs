//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines specific metrics for dispatching and the capability cache.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

lazy_static! {
	/// Global Prometheus registry.
	///
	/// This registry holds all metrics defined in this module and is used
	/// to gather metrics for exposure by the embedding application.
	pub static ref REGISTRY: Registry = Registry::new();

	/// Counter Vector for dispatch requests.
	///
	/// Counts every dispatch that passed validation, labelled by action type.
	pub static ref DISPATCHES_TOTAL: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("dispatches_total", "Total number of dispatched action requests"),
			&["action"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Gauge Vector for the number of filters returned by the latest dispatch of each action.
	pub static ref DISPATCH_RESULTS: GaugeVec = {
		let gauge = GaugeVec::new(
			Opts::new("dispatch_results", "Filters returned by the latest dispatch per action"),
			&["action"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Counter Vector for rejected requests, labelled by action and error kind.
	pub static ref VALIDATION_ERRORS_TOTAL: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("validation_errors_total", "Total number of rejected action parameters"),
			&["action", "kind"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Counter Vector for per-plugin failures.
	///
	/// Tracks builder errors, timeouts and capability query failures, with the
	/// plugin id and failure kind as labels.
	pub static ref PLUGIN_FAILURES_TOTAL: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("plugin_failures_total", "Total number of plugin failures during dispatch"),
			&["plugin", "kind"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Counter Vector for capability cache lookups.
	///
	/// The `outcome` label is `hit` when a stored or in-flight value was reused and
	/// `miss` when the lookup ran the underlying query.
	pub static ref CAPABILITY_CACHE_LOOKUPS_TOTAL: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("capability_cache_lookups_total", "Total number of capability cache lookups"),
			&["cache", "outcome"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Gauge Vector for the number of registered plugins, one series per
	/// plugin registry.
	pub static ref PLUGINS_REGISTERED: GaugeVec = {
		let gauge = GaugeVec::new(
			Opts::new("plugins_registered", "Number of registered action plugins"),
			&["registry"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

/// Records the outcome of a completed dispatch.
pub fn record_dispatch(action: &str, results: usize) {
	DISPATCHES_TOTAL.with_label_values(&[action]).inc();
	DISPATCH_RESULTS
		.with_label_values(&[action])
		.set(results as f64);
}

pub fn record_validation_error(action: &str, kind: &str) {
	VALIDATION_ERRORS_TOTAL
		.with_label_values(&[action, kind])
		.inc();
}

pub fn record_plugin_failure(plugin_id: &str, kind: &str) {
	PLUGIN_FAILURES_TOTAL
		.with_label_values(&[plugin_id, kind])
		.inc();
}

pub fn record_cache_lookup(cache: &str, hit: bool) {
	let outcome = if hit { "hit" } else { "miss" };
	CAPABILITY_CACHE_LOOKUPS_TOTAL
		.with_label_values(&[cache, outcome])
		.inc();
}

pub fn record_registered_plugins(registry: &str, count: usize) {
	PLUGINS_REGISTERED
		.with_label_values(&[registry])
		.set(count as f64);
}

/// Drops the series of a registry that no longer exists.
pub fn forget_registry(registry: &str) {
	let _ = PLUGINS_REGISTERED.remove_label_values(&[registry]);
}
