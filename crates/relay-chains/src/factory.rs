//! Lazily built, cached relay clients.

use crate::{AlloyRelayClient, RegisteredNetwork, RelayContractClient};
use alloy::signers::local::PrivateKeySigner;
use relay_types::SubmissionError;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tracing::{debug, info};

type ClientBuilder =
	dyn Fn(&RegisteredNetwork) -> Result<Arc<dyn RelayContractClient>, SubmissionError> + Send + Sync;
type ClientMap = HashMap<String, Arc<dyn RelayContractClient>>;

/// Hands out one shared client per network, building it on first use.
///
/// The cache lock is held only while looking a client up or inserting it,
/// never across a chain call.
pub struct RelayClientFactory {
	builder: Box<ClientBuilder>,
	clients: RwLock<ClientMap>,
}

impl RelayClientFactory {
	pub fn new<F>(builder: F) -> Self
	where
		F: Fn(&RegisteredNetwork) -> Result<Arc<dyn RelayContractClient>, SubmissionError>
			+ Send
			+ Sync
			+ 'static,
	{
		Self {
			builder: Box::new(builder),
			clients: RwLock::new(HashMap::new()),
		}
	}

	/// Factory of [`AlloyRelayClient`]s sending from `signer`'s account.
	pub fn alloy(signer: PrivateKeySigner, max_gas_limit: u64, poll_interval: Duration) -> Self {
		Self::new(move |network| {
			let client = AlloyRelayClient::new(network, signer.clone(), max_gas_limit)?
				.with_poll_interval(poll_interval);
			Ok(Arc::new(client) as Arc<dyn RelayContractClient>)
		})
	}

	/// Returns the client for `network`, creating it if needed.
	pub async fn client_for(
		&self,
		network: &RegisteredNetwork,
	) -> Result<Arc<dyn RelayContractClient>, SubmissionError> {
		if let Some(client) = self.clients.read().await.get(&network.name) {
			return Ok(client.clone());
		}

		let mut clients = self.clients.write().await;
		// Another request may have built it while we waited for the write lock.
		if let Some(client) = clients.get(&network.name) {
			return Ok(client.clone());
		}

		debug!(network = %network.name, rpc_url = %network.config.rpc_url, "Creating relay client");
		let client = (self.builder)(network)?;
		info!(
			network = %network.name,
			relayer = %client.relayer_address(),
			"Relay client ready"
		);
		clients.insert(network.name.clone(), client.clone());
		Ok(client)
	}
}
