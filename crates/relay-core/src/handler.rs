use crate::RelayError;
use alloy::primitives::{Address, B256, U256};
use relay_chains::{NetworkRegistry, RelayClientFactory};
use relay_envelope::{verify, VerificationContext};
use relay_types::{
	truncate_hash, MetaEnvelope, RelayOutcome, RelayRequest, RequestShapeError, SubmissionError,
	VerificationError,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, field, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Handler behaviour after a relay transaction has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerSettings {
	/// Answer only once the transaction is mined.
	pub wait_for_receipt: bool,
	pub receipt_timeout: Duration,
}

impl Default for HandlerSettings {
	fn default() -> Self {
		Self {
			wait_for_receipt: false,
			receipt_timeout: Duration::from_secs(120),
		}
	}
}

/// Validates, verifies and submits relay requests.
///
/// Requests are independent; the handler only shares the read-only registry
/// and the client cache between them.
pub struct RelayRequestHandler {
	registry: Arc<NetworkRegistry>,
	clients: Arc<RelayClientFactory>,
	settings: HandlerSettings,
}

impl RelayRequestHandler {
	pub fn new(
		registry: Arc<NetworkRegistry>,
		clients: Arc<RelayClientFactory>,
		settings: HandlerSettings,
	) -> Self {
		Self {
			registry,
			clients,
			settings,
		}
	}

	pub fn registry(&self) -> &NetworkRegistry {
		&self.registry
	}

	pub fn clients(&self) -> &RelayClientFactory {
		&self.clients
	}

	/// Handles one relay request. `None` means the request had no body.
	///
	/// Validation stops at the first failure. At most one relay transaction
	/// is submitted, and only for an envelope that verified.
	pub async fn handle(&self, request: Option<RelayRequest>) -> RelayOutcome {
		let span = info_span!("relay", request_id = %Uuid::new_v4(), network = field::Empty);

		async move {
			match self.relay(request).await {
				Ok(tx_hash) => {
					info!(tx_hash = %truncate_hash(&tx_hash), "Relay request succeeded");
					RelayOutcome::success(tx_hash)
				}
				Err(error) => {
					warn!(status = error.status_code(), %error, "Relay request failed");
					error.into_outcome()
				}
			}
		}
		.instrument(span)
		.await
	}

	async fn relay(&self, request: Option<RelayRequest>) -> Result<B256, RelayError> {
		let request = request.ok_or(RequestShapeError::MissingBody)?;
		let meta_signed_tx = request
			.meta_signed_tx
			.filter(|tx| !tx.trim().is_empty())
			.ok_or(RequestShapeError::MissingMetaSignedTx)?;
		let name = request
			.blockchain
			.filter(|name| !name.is_empty())
			.ok_or(RequestShapeError::MissingBlockchain)?;
		let network = self
			.registry
			.resolve(&name)
			.ok_or_else(|| RequestShapeError::UnknownBlockchain(name.clone()))?;
		Span::current().record("network", name.as_str());

		let envelope = relay_envelope::decode(&meta_signed_tx)?;
		debug!(
			signer = %envelope.claimed_signer,
			destination = %envelope.call.destination,
			payload_len = envelope.inner_tx_bytes().len(),
			"Decoded meta transaction"
		);

		let client = self.clients.client_for(&network).await?;
		let nonce = client.get_nonce(envelope.claimed_signer).await?;
		let signer = verify_at_nonce(&envelope, network.relay_contract, nonce)?;
		debug!(%signer, %nonce, "Meta signature verified");

		let tx_hash = client.submit(&envelope).await?;

		if self.settings.wait_for_receipt {
			let receipt = client
				.await_result(tx_hash, self.settings.receipt_timeout)
				.await?;
			if !receipt.success {
				return Err(SubmissionError::Reverted(format!(
					"relay transaction {} failed in block {}",
					tx_hash, receipt.block_number
				))
				.into());
			}
			debug!(block = receipt.block_number, "Relay transaction mined");
		}

		Ok(tx_hash)
	}
}

/// Verifies `envelope` at the signer's current nonce.
///
/// A signature that is only valid for the previous nonce belongs to a meta
/// transaction the contract has already executed; that is reported as a
/// submission failure rather than a forgery.
fn verify_at_nonce(
	envelope: &MetaEnvelope,
	relay_contract: Address,
	nonce: U256,
) -> Result<Address, RelayError> {
	match verify(envelope, &VerificationContext::new(relay_contract, nonce)) {
		Ok(signer) => Ok(signer),
		Err(error @ VerificationError::SignerMismatch { .. }) if !nonce.is_zero() => {
			let previous = VerificationContext::new(relay_contract, nonce - U256::from(1));
			if verify(envelope, &previous).is_ok() {
				Err(SubmissionError::NonceAlreadyUsed {
					signer: envelope.claimed_signer,
					current: nonce,
				}
				.into())
			} else {
				Err(error.into())
			}
		}
		Err(error) => Err(error.into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::{
		primitives::address,
		signers::local::PrivateKeySigner,
		sol_types::SolCall,
	};
	use relay_chains::{testing::MockRelayClient, RelayContractClient};
	use relay_envelope::testing::{EnvelopeBuilder, IMetaTestRegistry, LEGACY_LAYOUT_ENVELOPE};
	use relay_types::{NetworkConfig, RelayReceipt, RelayStatus};

	const RELAY: Address = address!("0x326c977e6efc84e512bb9c30f76e30c160ed06fb");
	const REGISTRY_CONTRACT: Address = address!("0x1111111111111111111111111111111111111111");

	fn setup(settings: HandlerSettings) -> (RelayRequestHandler, Arc<MockRelayClient>) {
		let mut registry = NetworkRegistry::new();
		registry
			.register(
				"test",
				NetworkConfig::new("1337", "http://localhost:8545", RELAY.to_string()),
			)
			.unwrap();

		let mock = Arc::new(MockRelayClient::new());
		let client = mock.clone();
		let factory =
			RelayClientFactory::new(move |_| Ok(client.clone() as Arc<dyn RelayContractClient>));

		let handler = RelayRequestHandler::new(Arc::new(registry), Arc::new(factory), settings);
		(handler, mock)
	}

	fn register_envelope(value: u64) -> EnvelopeBuilder {
		EnvelopeBuilder::new(PrivateKeySigner::random(), RELAY)
			.register_call(REGISTRY_CONTRACT, U256::from(value))
	}

	fn message(outcome: &RelayOutcome) -> &str {
		outcome.body.message.as_deref().unwrap_or_default()
	}

	#[tokio::test]
	async fn test_missing_body() {
		let (handler, mock) = setup(HandlerSettings::default());
		let outcome = handler.handle(None).await;

		assert_eq!(outcome.status_code, 400);
		assert_eq!(outcome.body.status, RelayStatus::Error);
		assert!(message(&outcome).contains("no body"));
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_missing_meta_signed_tx() {
		let (handler, _) = setup(HandlerSettings::default());

		for request in [
			RelayRequest::default(),
			RelayRequest {
				meta_signed_tx: Some("  ".into()),
				blockchain: Some("test".into()),
			},
		] {
			let outcome = handler.handle(Some(request)).await;
			assert_eq!(outcome.status_code, 400);
			assert!(message(&outcome).contains("metaSignedTx"));
		}
	}

	#[tokio::test]
	async fn test_missing_or_unknown_blockchain() {
		let (handler, mock) = setup(HandlerSettings::default());

		let request = RelayRequest {
			meta_signed_tx: Some("0x123".into()),
			blockchain: None,
		};
		let outcome = handler.handle(Some(request)).await;
		assert_eq!(outcome.status_code, 400);
		assert!(message(&outcome).contains("blockchain"));

		let outcome = handler
			.handle(Some(RelayRequest::new("0x123", "Test")))
			.await;
		assert_eq!(outcome.status_code, 400);
		assert!(message(&outcome).contains("blockchain"));
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_undecodable_envelope() {
		let (handler, mock) = setup(HandlerSettings::default());

		for tx in ["0x123", "0xdeadbeef", "not hex at all"] {
			let outcome = handler.handle(Some(RelayRequest::new(tx, "test"))).await;
			assert_eq!(outcome.status_code, 403, "{tx}");
			assert!(message(&outcome).starts_with("Meta signature invalid"));
		}
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_legacy_layout_envelope_rejected() {
		let (handler, mock) = setup(HandlerSettings::default());

		let outcome = handler
			.handle(Some(RelayRequest::new(LEGACY_LAYOUT_ENVELOPE, "test")))
			.await;

		assert_eq!(outcome.status_code, 403);
		assert_eq!(outcome.body.status, RelayStatus::Error);
		assert!(message(&outcome).starts_with("Meta signature invalid"));
		assert!(message(&outcome).contains("b4fadcad"));
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_forged_signature_rejected() {
		let (handler, mock) = setup(HandlerSettings::default());

		// Payload names the victim, the signature comes from someone else.
		let victim = register_envelope(7);
		let forged = EnvelopeBuilder::new(PrivateKeySigner::random(), RELAY)
			.destination(REGISTRY_CONTRACT)
			.data(victim.call_params().data);

		let outcome = handler
			.handle(Some(RelayRequest::new(forged.build_hex(), "test")))
			.await;

		assert_eq!(outcome.status_code, 403);
		assert!(message(&outcome).contains("Meta signature invalid"));
		assert!(!outcome.is_success());
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_envelope_for_other_relay_rejected() {
		let (handler, mock) = setup(HandlerSettings::default());
		let other_relay = address!("0x9999999999999999999999999999999999999999");
		let envelope = EnvelopeBuilder::new(PrivateKeySigner::random(), other_relay)
			.register_call(REGISTRY_CONTRACT, U256::from(1));

		let outcome = handler
			.handle(Some(RelayRequest::new(envelope.build_hex(), "test")))
			.await;

		assert_eq!(outcome.status_code, 403);
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_relays_register_call() {
		let (handler, mock) = setup(HandlerSettings::default());
		let builder = register_envelope(42);

		let outcome = handler
			.handle(Some(RelayRequest::new(format!("0x{}", builder.build_hex()), "test")))
			.await;

		assert_eq!(outcome.status_code, 200);
		assert_eq!(outcome.body.status, RelayStatus::Success);
		let tx_hash = outcome.body.tx_hash.as_deref().unwrap();
		assert!(tx_hash.starts_with("0x"));
		assert_eq!(tx_hash.len(), 66);

		let submissions = mock.submissions();
		assert_eq!(submissions.len(), 1);
		assert_eq!(submissions[0].call.destination, REGISTRY_CONTRACT);
		let call = IMetaTestRegistry::registerCall::abi_decode(submissions[0].inner_tx_bytes()).unwrap();
		assert_eq!(call._registrant, builder.signer_address());
		assert_eq!(call._data, U256::from(42));
		assert_eq!(mock.nonce_of(builder.signer_address()), U256::from(1));
	}

	#[tokio::test]
	async fn test_signature_at_current_nonce() {
		let (handler, mock) = setup(HandlerSettings::default());
		let builder = register_envelope(1).nonce(U256::from(5));
		mock.set_nonce(builder.signer_address(), U256::from(5));

		let outcome = handler
			.handle(Some(RelayRequest::new(builder.build_hex(), "test")))
			.await;
		assert_eq!(outcome.status_code, 200);
	}

	#[tokio::test]
	async fn test_replay_is_submission_error() {
		let (handler, mock) = setup(HandlerSettings::default());
		let hex = register_envelope(42).build_hex();

		let first = handler.handle(Some(RelayRequest::new(hex.clone(), "test"))).await;
		assert_eq!(first.status_code, 200);

		let second = handler.handle(Some(RelayRequest::new(hex, "test"))).await;
		assert_eq!(second.status_code, 502);
		assert!(!second.is_success());
		assert!(message(&second).contains("nonce already used"));
		assert_eq!(mock.submissions().len(), 1);
	}

	#[tokio::test]
	async fn test_nonce_read_failure() {
		let (handler, mock) = setup(HandlerSettings::default());
		mock.fail_nonce_reads(SubmissionError::Transport("connection refused".into()));

		let outcome = handler
			.handle(Some(RelayRequest::new(register_envelope(1).build_hex(), "test")))
			.await;

		assert_eq!(outcome.status_code, 502);
		assert!(message(&outcome).contains("connection refused"));
		assert!(mock.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_revert_reason_surfaced() {
		let (handler, mock) = setup(HandlerSettings::default());
		mock.fail_submissions(SubmissionError::Reverted("sender not whitelisted".into()));

		let outcome = handler
			.handle(Some(RelayRequest::new(register_envelope(1).build_hex(), "test")))
			.await;

		assert_eq!(outcome.status_code, 502);
		assert_eq!(
			message(&outcome),
			"Execution reverted: sender not whitelisted"
		);
	}

	#[tokio::test]
	async fn test_failed_receipt_when_waiting() {
		let settings = HandlerSettings {
			wait_for_receipt: true,
			receipt_timeout: Duration::from_secs(1),
		};
		let (handler, mock) = setup(settings);
		mock.set_receipt_result(Ok(RelayReceipt {
			tx_hash: B256::ZERO,
			block_number: 10,
			success: false,
		}));

		let outcome = handler
			.handle(Some(RelayRequest::new(register_envelope(1).build_hex(), "test")))
			.await;

		assert_eq!(outcome.status_code, 502);
		assert!(message(&outcome).contains("reverted"));
	}

	#[tokio::test]
	async fn test_pending_timeout_when_waiting() {
		let settings = HandlerSettings {
			wait_for_receipt: true,
			receipt_timeout: Duration::from_secs(1),
		};
		let (handler, mock) = setup(settings);
		mock.set_receipt_result(Err(SubmissionError::PendingTimeout {
			hash: B256::ZERO,
			secs: 1,
		}));

		let outcome = handler
			.handle(Some(RelayRequest::new(register_envelope(1).build_hex(), "test")))
			.await;

		assert_eq!(outcome.status_code, 504);
		assert!(message(&outcome).contains("timed out"));
	}

	#[tokio::test]
	async fn test_concurrent_requests_are_independent() {
		let (handler, mock) = setup(HandlerSettings::default());
		let handler = Arc::new(handler);

		let tasks: Vec<_> = (0..8u64)
			.map(|i| {
				let handler = handler.clone();
				let hex = register_envelope(i).build_hex();
				tokio::spawn(async move { handler.handle(Some(RelayRequest::new(hex, "test"))).await })
			})
			.collect();

		for task in tasks {
			assert_eq!(task.await.unwrap().status_code, 200);
		}
		assert_eq!(mock.submissions().len(), 8);
	}
}
