//! Client-side envelope construction for tests.
//!
//! Mirrors what a wallet library does: sign the relay digest with the user
//! key, wrap the `relayMetaTx` call in an unsigned legacy transaction and hex
//! encode its RLP.

use alloy::{
	primitives::{Address, Bytes, B256, U256},
	rlp::{Encodable, Header},
	signers::{local::PrivateKeySigner, SignerSync},
	sol,
	sol_types::SolCall,
};
use relay_types::{MetaSignature, RelayCallParams};

use crate::{contracts::ITxRelay, verifier::relay_digest};

sol! {
	/// Destination contract used by the relay tests.
	interface IMetaTestRegistry {
		function register(address _registrant, uint256 _data) external;
		function registry(address registrant) external view returns (uint256);
	}
}

/// Envelope produced by an older client using the five-argument relay
/// call (no whitelist owner). It must not decode.
pub const LEGACY_LAYOUT_ENVELOPE: &str = concat!(
	"f902068080831e848094c67bce9957c8a593753eeabc57bba1cf09163e6d80b901e4b4fadcad00000000000000000000",
	"0000000000000000000000000000000000000000001b0a922c900621b84babc77d255049939eec3bb82389d5e6e21ca7",
	"48c522090cab4a31590270faa377124100f1db89c3cbd07a59e208ae0fa5d502242cc7d5d97000000000000000000000",
	"0000a80e11593aff7ce20c6818e73ed78841912b3f200000000000000000000000000000000000000000000000000000",
	"0000000000a00000000000000000000000000000000000000000000000000000000000000104701b8826000000000000",
	"000000000000891349787dcab0af52642a976b652449aca23f0b0000000000000000000000004449004968111f12947e",
	"1cf60cbe6dd61cb168140000000000000000000000009d380e95d54fb868251fc62b252eec4c42d692d6000000000000",
	"000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
	"000000000000000000a00000000000000000000000000000000000000000000000000000000000000024f207564e0000",
	"0000000000000000000000000000000000000000000000000000000220fe000000000000000000000000000000000000",
	"00000000000000000000000000000000000000000000000000000000000000000000000000001c4080",
);

/// Builds meta-signed transactions the way a client would.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
	signer: PrivateKeySigner,
	relay_contract: Address,
	whitelist_owner: Address,
	destination: Address,
	data: Bytes,
	nonce: U256,
	gas_price: u128,
	gas_limit: u64,
	placeholders: bool,
	signature: Option<MetaSignature>,
	raw_recipient: Option<Bytes>,
	raw_calldata: Option<Bytes>,
}

impl EnvelopeBuilder {
	pub fn new(signer: PrivateKeySigner, relay_contract: Address) -> Self {
		Self {
			signer,
			relay_contract,
			whitelist_owner: Address::ZERO,
			destination: Address::ZERO,
			data: Bytes::new(),
			nonce: U256::ZERO,
			gas_price: 0,
			gas_limit: 2_000_000,
			placeholders: true,
			signature: None,
			raw_recipient: None,
			raw_calldata: None,
		}
	}

	/// Targets `register(signer, value)` on `destination`.
	pub fn register_call(mut self, destination: Address, value: U256) -> Self {
		self.destination = destination;
		self.data = IMetaTestRegistry::registerCall {
			_registrant: self.signer.address(),
			_data: value,
		}
		.abi_encode()
		.into();
		self
	}

	pub fn destination(mut self, destination: Address) -> Self {
		self.destination = destination;
		self
	}

	pub fn data(mut self, data: Bytes) -> Self {
		self.data = data;
		self
	}

	pub fn whitelist_owner(mut self, owner: Address) -> Self {
		self.whitelist_owner = owner;
		self
	}

	/// Meta nonce the signature commits to.
	pub fn nonce(mut self, nonce: U256) -> Self {
		self.nonce = nonce;
		self
	}

	pub fn gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = gas_limit;
		self
	}

	/// Whether to append the `v, r, s` placeholders after the six fields.
	pub fn with_placeholders(mut self, placeholders: bool) -> Self {
		self.placeholders = placeholders;
		self
	}

	/// Uses `signature` instead of signing with the builder's key.
	pub fn with_signature(mut self, signature: MetaSignature) -> Self {
		self.signature = Some(signature);
		self
	}

	/// Encodes `recipient` verbatim as the wrapper `to` field.
	pub fn with_raw_recipient(mut self, recipient: Bytes) -> Self {
		self.raw_recipient = Some(recipient);
		self
	}

	/// Encodes `calldata` verbatim as the wrapper `data` field.
	pub fn with_raw_calldata(mut self, calldata: Bytes) -> Self {
		self.raw_calldata = Some(calldata);
		self
	}

	pub fn signer_address(&self) -> Address {
		self.signer.address()
	}

	pub fn call_params(&self) -> RelayCallParams {
		RelayCallParams {
			whitelist_owner: self.whitelist_owner,
			destination: self.destination,
			data: self.data.clone(),
		}
	}

	/// Signs the relay digest with the builder's key.
	pub fn sign(&self) -> MetaSignature {
		let digest = relay_digest(self.relay_contract, &self.call_params(), self.nonce);
		let signature = self
			.signer
			.sign_hash_sync(&digest)
			.expect("signing with a local key");

		MetaSignature {
			v: 27 + u8::from(signature.v()),
			r: B256::from(signature.r().to_be_bytes::<32>()),
			s: B256::from(signature.s().to_be_bytes::<32>()),
		}
	}

	/// Calldata of the wrapper transaction.
	pub fn relay_calldata(&self) -> Bytes {
		if let Some(raw) = &self.raw_calldata {
			return raw.clone();
		}
		let signature = self.signature.unwrap_or_else(|| self.sign());
		ITxRelay::relayMetaTxCall {
			sigV: signature.v,
			sigR: signature.r,
			sigS: signature.s,
			destination: self.destination,
			data: self.data.clone(),
			listOwner: self.whitelist_owner,
		}
		.abi_encode()
		.into()
	}

	/// Hex encoded RLP of the unsigned wrapper transaction, without `0x`.
	pub fn build_hex(&self) -> String {
		let recipient = self
			.raw_recipient
			.clone()
			.unwrap_or_else(|| Bytes::copy_from_slice(self.relay_contract.as_slice()));
		let calldata = self.relay_calldata();

		let mut payload = Vec::new();
		0u64.encode(&mut payload);
		self.gas_price.encode(&mut payload);
		self.gas_limit.encode(&mut payload);
		recipient.encode(&mut payload);
		U256::ZERO.encode(&mut payload);
		calldata.encode(&mut payload);
		if self.placeholders {
			// Placeholder signature as emitted by ethereumjs-tx: v = 28, empty r and s.
			28u8.encode(&mut payload);
			Bytes::new().encode(&mut payload);
			Bytes::new().encode(&mut payload);
		}

		let mut out = Vec::new();
		Header {
			list: true,
			payload_length: payload.len(),
		}
		.encode(&mut out);
		out.extend_from_slice(&payload);
		hex::encode(out)
	}
}
