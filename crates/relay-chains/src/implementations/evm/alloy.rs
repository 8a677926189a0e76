//! Alloy-based relay contract client.
//!
//! Reads nonces with `eth_call` and submits `relayMetaTx` transactions signed
//! by the relay's own key. The provider's fillers take care of the account
//! nonce, gas and chain id.

use crate::{RegisteredNetwork, RelayContractClient};
use alloy::{
	network::{EthereumWallet, TransactionBuilder},
	primitives::{Address, Bytes, B256, U256},
	providers::{DynProvider, Provider, ProviderBuilder},
	rpc::types::TransactionRequest,
	signers::local::PrivateKeySigner,
	sol_types::{decode_revert_reason, Revert, SolCall, SolError, SolValue},
	transports::{http::reqwest::Url, TransportError},
};
use async_trait::async_trait;
use relay_envelope::{contracts::ITxRelay, encode_relay_call};
use relay_types::{truncate_hash, MetaEnvelope, RelayReceipt, SubmissionError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Relay contract client for one EVM network.
pub struct AlloyRelayClient {
	provider: DynProvider,
	network: String,
	relay_contract: Address,
	relayer: Address,
	max_gas_limit: u64,
	poll_interval: Duration,
}

impl AlloyRelayClient {
	/// Creates a client for `network` sending from `signer`'s account.
	///
	/// No request is made until the first call.
	pub fn new(
		network: &RegisteredNetwork,
		signer: PrivateKeySigner,
		max_gas_limit: u64,
	) -> Result<Self, SubmissionError> {
		let url: Url = network.config.rpc_url.parse().map_err(|e| {
			SubmissionError::Unavailable(format!("Invalid RPC URL for {}: {}", network.name, e))
		})?;

		let relayer = signer.address();
		// Cached nonces keep concurrent relays from the same account apart.
		let provider = ProviderBuilder::new()
			.with_gas_estimation()
			.with_cached_nonce_management()
			.wallet(EthereumWallet::from(signer))
			.connect_http(url)
			.erased();

		Ok(Self {
			provider,
			network: network.name.clone(),
			relay_contract: network.relay_contract,
			relayer,
			max_gas_limit,
			poll_interval: DEFAULT_POLL_INTERVAL,
		})
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	/// Gas limit for the relay transaction: the client's wrapper limit when
	/// set, never above the configured cap. `None` lets the provider estimate.
	fn gas_limit_for(&self, envelope: &MetaEnvelope) -> Option<u64> {
		match envelope.wrapper.gas_limit {
			0 => None,
			requested => Some(requested.min(self.max_gas_limit)),
		}
	}

	fn relay_request(&self, input: Bytes) -> TransactionRequest {
		TransactionRequest::default()
			.with_from(self.relayer)
			.with_to(self.relay_contract)
			.with_input(input)
	}
}

#[async_trait]
impl RelayContractClient for AlloyRelayClient {
	fn relayer_address(&self) -> Address {
		self.relayer
	}

	async fn get_nonce(&self, signer: Address) -> Result<U256, SubmissionError> {
		let call = ITxRelay::getNonceCall { add: signer };
		let output = self
			.provider
			.call(self.relay_request(call.abi_encode().into()))
			.await
			.map_err(classify_rpc_error)?;

		<U256 as SolValue>::abi_decode(&output).map_err(|e| {
			SubmissionError::Transport(format!("Malformed getNonce result: {}", e))
		})
	}

	async fn submit(&self, envelope: &MetaEnvelope) -> Result<B256, SubmissionError> {
		let mut request = self.relay_request(encode_relay_call(envelope));
		if let Some(gas_limit) = self.gas_limit_for(envelope) {
			request = request.with_gas_limit(gas_limit);
		}

		// Dry run first so a reverting call costs nothing and keeps its reason.
		self.provider
			.call(request.clone())
			.await
			.map_err(classify_rpc_error)?;

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(classify_rpc_error)?;
		let tx_hash = *pending.tx_hash();

		info!(
			network = %self.network,
			tx_hash = %truncate_hash(&tx_hash),
			signer = %envelope.claimed_signer,
			"Submitted relay transaction"
		);
		Ok(tx_hash)
	}

	async fn await_result(
		&self,
		tx_hash: B256,
		timeout: Duration,
	) -> Result<RelayReceipt, SubmissionError> {
		let start_time = Instant::now();
		info!(
			tx_hash = %truncate_hash(&tx_hash),
			"Waiting for receipt (timeout: {}s)",
			timeout.as_secs()
		);

		loop {
			if start_time.elapsed() > timeout {
				return Err(SubmissionError::PendingTimeout {
					hash: tx_hash,
					secs: timeout.as_secs(),
				});
			}

			match self
				.provider
				.get_transaction_receipt(tx_hash)
				.await
				.map_err(classify_rpc_error)?
			{
				Some(receipt) => {
					return Ok(RelayReceipt {
						tx_hash,
						block_number: receipt.block_number.unwrap_or(0),
						success: receipt.status(),
					});
				}
				None => {
					debug!(tx_hash = %truncate_hash(&tx_hash), "Transaction not yet mined");
					tokio::time::sleep(self.poll_interval).await;
				}
			}
		}
	}
}

/// Sorts a JSON-RPC failure into revert, node error or transport error.
fn classify_rpc_error(err: TransportError) -> SubmissionError {
	let Some(payload) = err.as_error_resp() else {
		return SubmissionError::Transport(err.to_string());
	};

	if let Some(data) = payload.as_revert_data() {
		// Plain `Error(string)` reverts keep their bare reason.
		let reason = Revert::abi_decode(&data)
			.map(|revert| revert.reason)
			.ok()
			.or_else(|| decode_revert_reason(&data))
			.unwrap_or_else(|| format!("0x{}", hex::encode(&data)));
		return SubmissionError::Reverted(reason);
	}
	if payload.message.to_lowercase().contains("revert") {
		return SubmissionError::Reverted(payload.message.to_string());
	}

	SubmissionError::Rpc {
		code: payload.code,
		message: payload.message.to_string(),
	}
}
