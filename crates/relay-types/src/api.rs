//! Request and response shapes of the relay endpoint.

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};

/// Relay request as submitted by a client.
///
/// Both fields are optional at this level so that the handler, not the
/// deserializer, decides how a missing field is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayRequest {
	/// Hex encoded meta-signed wrapper transaction.
	pub meta_signed_tx: Option<String>,
	/// Name of the target network.
	pub blockchain: Option<String>,
}

impl RelayRequest {
	pub fn new(meta_signed_tx: impl Into<String>, blockchain: impl Into<String>) -> Self {
		Self {
			meta_signed_tx: Some(meta_signed_tx.into()),
			blockchain: Some(blockchain.into()),
		}
	}

	/// Interprets a raw request body.
	///
	/// Returns `None` when there is no usable body: empty input, the JSON
	/// literal `null`, anything that is not a JSON object, or bytes that are not
	/// JSON at all. Fields holding non-string values are treated as absent.
	pub fn from_body(body: &[u8]) -> Option<Self> {
		if body.iter().all(|b| b.is_ascii_whitespace()) {
			return None;
		}

		let value: serde_json::Value = serde_json::from_slice(body).ok()?;
		let object = value.as_object()?;

		let field = |name: &str| {
			object
				.get(name)
				.and_then(|v| v.as_str())
				.map(|s| s.to_string())
		};

		Some(Self {
			meta_signed_tx: field("metaSignedTx"),
			blockchain: field("blockchain"),
		})
	}
}

/// Overall result of a relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStatus {
	Success,
	Error,
}

/// JSON body returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponseBody {
	pub status: RelayStatus,
	/// Failure reason, present on error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Hash of the submitted relay transaction, present on success.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
}

/// Outcome of a relay request together with its HTTP-style status code.
///
/// A successful outcome can only be built from a transaction hash, so a
/// `success` status never exists without an on-chain identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayOutcome {
	pub status_code: u16,
	pub body: RelayResponseBody,
}

impl RelayOutcome {
	/// Outcome of a relay transaction that was accepted by the network.
	pub fn success(tx_hash: B256) -> Self {
		Self {
			status_code: 200,
			body: RelayResponseBody {
				status: RelayStatus::Success,
				message: None,
				tx_hash: Some(tx_hash.to_string()),
			},
		}
	}

	/// Outcome of a rejected or failed request.
	pub fn error(status_code: u16, message: impl Into<String>) -> Self {
		Self {
			status_code,
			body: RelayResponseBody {
				status: RelayStatus::Error,
				message: Some(message.into()),
				tx_hash: None,
			},
		}
	}

	pub fn is_success(&self) -> bool {
		self.body.status == RelayStatus::Success
	}
}
