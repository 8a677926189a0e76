//! Decoded structure of a meta-signed transaction.
//!
//! A client wraps the call it wants to make (`destination`, `data`) in a
//! `relayMetaTx(...)` call to the relay contract, signs the call parameters
//! with its own key (the meta signature), and RLP encodes the whole thing as
//! an unsigned legacy transaction. The relay pays the fees: it re-signs a
//! fresh wrapper transaction with its own key and submits it.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Meta signature produced by the end user over the relay digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSignature {
	/// Recovery byte, normally 27 or 28.
	pub v: u8,
	pub r: B256,
	pub s: B256,
}

/// Parameters of the `relayMetaTx` call besides the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCallParams {
	/// Owner of the sender whitelist, zero for "any relay may submit".
	pub whitelist_owner: Address,
	/// Contract the relay forwards the payload to.
	pub destination: Address,
	/// Calldata forwarded to `destination`.
	pub data: Bytes,
}

/// Fields of the unsigned wrapper transaction built by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperTransaction {
	pub nonce: u64,
	pub gas_price: u128,
	pub gas_limit: u64,
	/// Relay contract the client addressed.
	pub to: Address,
	pub value: U256,
}

/// Fully decoded meta-transaction envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEnvelope {
	pub wrapper: WrapperTransaction,
	pub signature: MetaSignature,
	pub call: RelayCallParams,
	/// Address embedded in the payload as its first argument. Must be
	/// confirmed by signature recovery, never trusted as is.
	pub claimed_signer: Address,
}

impl MetaEnvelope {
	/// Payload forwarded to the destination contract.
	pub fn inner_tx_bytes(&self) -> &Bytes {
		&self.call.data
	}
}
