//! Integration tests for cancelling dispatches on shutdown.

use std::time::Duration;
use tokio::sync::watch;

use action_filter_registry::{
	models::ActionType,
	services::registry::{DispatchError, Dispatcher},
	utils::tests::{params::ParamsBuilder, plugin::TestPluginBuilder},
};

#[tokio::test]
async fn test_shutdown_during_dispatch_returns_cancelled() {
	let dispatcher = Dispatcher::default();
	dispatcher
		.register_plugin(
			TestPluginBuilder::new("slow")
				.delay(Duration::from_secs(5))
				.build_arc(),
		)
		.await
		.unwrap();

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(20)).await;
		let _ = shutdown_tx.send(true);
	});

	let started = std::time::Instant::now();
	let error = dispatcher
		.dispatch_with_shutdown(ActionType::Swap, &ParamsBuilder::swap(1).build(), shutdown_rx)
		.await
		.unwrap_err();

	assert!(matches!(error, DispatchError::Cancelled(_)));
	assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_already_signalled_shutdown_skips_plugins() {
	let dispatcher = Dispatcher::default();
	let plugin = TestPluginBuilder::new("uniswap").build();
	dispatcher.register_plugin(plugin.clone()).await.unwrap();

	let (_shutdown_tx, shutdown_rx) = watch::channel(true);
	let error = dispatcher
		.dispatch_with_shutdown(ActionType::Swap, &ParamsBuilder::swap(1).build(), shutdown_rx)
		.await
		.unwrap_err();

	assert!(matches!(error, DispatchError::Cancelled(_)));
	assert_eq!(plugin.build_calls(), 0);
}

#[tokio::test]
async fn test_unsignalled_shutdown_completes_normally() {
	let dispatcher = Dispatcher::default();
	dispatcher
		.register_plugin(TestPluginBuilder::new("uniswap").build_arc())
		.await
		.unwrap();

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let outcome = dispatcher
		.dispatch_with_shutdown(ActionType::Swap, &ParamsBuilder::swap(1).build(), shutdown_rx)
		.await
		.unwrap();
	assert_eq!(outcome.plugin_ids(), vec!["uniswap"]);
	drop(shutdown_tx);
}
