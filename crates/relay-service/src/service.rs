//! Wiring of configuration into a running relay.

use crate::api;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use relay_chains::{NetworkRegistry, RelayClientFactory};
use relay_config::RelayConfig;
use relay_core::{HandlerSettings, RelayRequestHandler};
use std::{sync::Arc, time::Duration};
use tracing::info;

pub struct RelayService {
	handler: Arc<RelayRequestHandler>,
	config: RelayConfig,
}

impl RelayService {
	/// Builds the registry, relay account and request handler from `config`.
	pub fn from_config(config: RelayConfig) -> Result<Self> {
		let registry = build_registry(&config)?;
		let signer: PrivateKeySigner = config
			.relay
			.private_key
			.parse()
			.context("Invalid relay private key")?;
		info!(relayer = %signer.address(), "Relay account loaded");

		let clients = RelayClientFactory::alloy(
			signer,
			config.relay.max_gas_limit,
			Duration::from_secs(config.relay.receipt_poll_interval_secs),
		);
		let settings = HandlerSettings {
			wait_for_receipt: config.relay.wait_for_receipt,
			receipt_timeout: Duration::from_secs(config.relay.receipt_timeout_secs),
		};
		let handler = RelayRequestHandler::new(Arc::new(registry), Arc::new(clients), settings);

		Ok(Self {
			handler: Arc::new(handler),
			config,
		})
	}

	/// Serves the HTTP API until `shutdown` completes.
	pub async fn run<F>(self, shutdown: F) -> Result<()>
	where
		F: std::future::Future<Output = ()> + Send + 'static,
	{
		let app = api::router(
			self.handler,
			Duration::from_secs(self.config.relay.request_timeout_secs),
		);
		api::serve(app, &self.config.relay.http_host, self.config.relay.http_port, shutdown).await
	}
}

/// Validated network registry of `config`.
pub fn build_registry(config: &RelayConfig) -> Result<NetworkRegistry> {
	let registry =
		NetworkRegistry::from_networks(&config.networks).context("Invalid network configuration")?;
	info!(networks = ?registry.names(), "Network registry ready");
	Ok(registry)
}
