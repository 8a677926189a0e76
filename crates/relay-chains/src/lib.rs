//! Chain access for the relay.
//!
//! This crate knows which networks the relay serves ([`NetworkRegistry`]) and
//! how to talk to the relay contract deployed on each of them
//! ([`RelayContractClient`]). Clients are built lazily per network by a
//! [`RelayClientFactory`] and shared between requests.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use relay_types::{MetaEnvelope, RelayReceipt, SubmissionError};
use std::time::Duration;

mod factory;
pub mod implementations;
pub mod registry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use factory::RelayClientFactory;
pub use implementations::evm::AlloyRelayClient;
pub use registry::{NetworkRegistry, RegisteredNetwork, RegistryError};

/// Operations the relay performs against a relay contract.
///
/// Implementations must not cache chain state: every call reflects the node's
/// view at the time of the call.
#[async_trait]
pub trait RelayContractClient: Send + Sync {
	/// Account the relay sends transactions from.
	fn relayer_address(&self) -> Address;

	/// Current meta nonce of `signer` (`getNonce(address)`).
	async fn get_nonce(&self, signer: Address) -> Result<U256, SubmissionError>;

	/// Sends the envelope's `relayMetaTx` call from the relayer account and
	/// returns the transaction hash.
	async fn submit(&self, envelope: &MetaEnvelope) -> Result<B256, SubmissionError>;

	/// Waits until `tx_hash` is mined or `timeout` elapses.
	async fn await_result(
		&self,
		tx_hash: B256,
		timeout: Duration,
	) -> Result<RelayReceipt, SubmissionError>;
}
