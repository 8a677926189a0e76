//! In-memory relay client for tests.
//!
//! Behaves like a relay contract: it tracks a meta nonce per signer and bumps
//! it on every accepted submission, so replays of a consumed envelope can be
//! observed without a node.

use crate::RelayContractClient;
use alloy::primitives::{keccak256, Address, B256, U256};
use async_trait::async_trait;
use relay_envelope::encode_relay_call;
use relay_types::{MetaEnvelope, RelayReceipt, SubmissionError};
use std::{
	collections::HashMap,
	sync::Mutex,
	time::Duration,
};

#[derive(Debug)]
pub struct MockRelayClient {
	relayer: Address,
	nonces: Mutex<HashMap<Address, U256>>,
	submitted: Mutex<Vec<MetaEnvelope>>,
	nonce_error: Mutex<Option<SubmissionError>>,
	submit_error: Mutex<Option<SubmissionError>>,
	receipt: Mutex<Option<Result<RelayReceipt, SubmissionError>>>,
}

impl Default for MockRelayClient {
	fn default() -> Self {
		Self::new()
	}
}

impl MockRelayClient {
	pub fn new() -> Self {
		Self {
			relayer: Address::repeat_byte(0x42),
			nonces: Mutex::new(HashMap::new()),
			submitted: Mutex::new(Vec::new()),
			nonce_error: Mutex::new(None),
			submit_error: Mutex::new(None),
			receipt: Mutex::new(None),
		}
	}

	pub fn set_nonce(&self, signer: Address, nonce: U256) {
		self.nonces.lock().unwrap().insert(signer, nonce);
	}

	pub fn nonce_of(&self, signer: Address) -> U256 {
		self.nonces.lock().unwrap().get(&signer).copied().unwrap_or_default()
	}

	/// Makes every `get_nonce` call fail with `error`.
	pub fn fail_nonce_reads(&self, error: SubmissionError) {
		*self.nonce_error.lock().unwrap() = Some(error);
	}

	/// Makes every `submit` call fail with `error`.
	pub fn fail_submissions(&self, error: SubmissionError) {
		*self.submit_error.lock().unwrap() = Some(error);
	}

	/// Result returned by `await_result` instead of a successful receipt.
	pub fn set_receipt_result(&self, result: Result<RelayReceipt, SubmissionError>) {
		*self.receipt.lock().unwrap() = Some(result);
	}

	/// Envelopes accepted so far, in order.
	pub fn submissions(&self) -> Vec<MetaEnvelope> {
		self.submitted.lock().unwrap().clone()
	}
}

#[async_trait]
impl RelayContractClient for MockRelayClient {
	fn relayer_address(&self) -> Address {
		self.relayer
	}

	async fn get_nonce(&self, signer: Address) -> Result<U256, SubmissionError> {
		if let Some(error) = self.nonce_error.lock().unwrap().clone() {
			return Err(error);
		}
		Ok(self.nonce_of(signer))
	}

	async fn submit(&self, envelope: &MetaEnvelope) -> Result<B256, SubmissionError> {
		if let Some(error) = self.submit_error.lock().unwrap().clone() {
			return Err(error);
		}

		let mut nonces = self.nonces.lock().unwrap();
		let nonce = nonces.entry(envelope.claimed_signer).or_default();
		*nonce += U256::from(1);

		let mut submitted = self.submitted.lock().unwrap();
		submitted.push(envelope.clone());

		let mut preimage = encode_relay_call(envelope).to_vec();
		preimage.extend_from_slice(&submitted.len().to_be_bytes());
		Ok(keccak256(preimage))
	}

	async fn await_result(
		&self,
		tx_hash: B256,
		_timeout: Duration,
	) -> Result<RelayReceipt, SubmissionError> {
		match self.receipt.lock().unwrap().clone() {
			Some(result) => result,
			None => Ok(RelayReceipt {
				tx_hash,
				block_number: 1,
				success: true,
			}),
		}
	}
}
