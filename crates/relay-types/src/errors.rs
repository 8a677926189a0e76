//! Error taxonomy of the relay pipeline.
//!
//! Each stage owns one enum. Request shape problems are client mistakes,
//! decode and verification failures are security relevant rejections, and
//! submission failures come from the chain and carry its reason verbatim.

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

/// Problems with the request itself, detected before any decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestShapeError {
	#[error("Request has no body")]
	MissingBody,
	#[error("metaSignedTx parameter missing")]
	MissingMetaSignedTx,
	#[error("blockchain parameter missing")]
	MissingBlockchain,
	#[error("blockchain '{0}' is not supported")]
	UnknownBlockchain(String),
}

/// Structural errors while decoding an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	#[error("Invalid hex: {0}")]
	InvalidHex(String),
	#[error("Envelope too short: {len} bytes, need at least {min}")]
	TooShort { len: usize, min: usize },
	#[error("Malformed RLP: {0}")]
	Rlp(String),
	#[error("Wrapper transaction has {0} fields, expected 6 or 9")]
	FieldCount(usize),
	#[error("Trailing bytes after wrapper transaction")]
	TrailingBytes,
	#[error("Wrapper transaction recipient must be 20 bytes, got {0}")]
	InvalidRecipient(usize),
	#[error("Unexpected function selector 0x{0}")]
	UnknownSelector(String),
	#[error("Malformed relay call: {0}")]
	Abi(String),
	#[error("Relayed payload too short to carry a signer: {0} bytes")]
	PayloadTooShort(usize),
}

/// Reasons a decoded envelope is not authorized by its claimed signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
	#[error("Invalid recovery id {0}")]
	InvalidRecoveryId(u8),
	#[error("Signature component {0} out of range")]
	ComponentOutOfRange(&'static str),
	#[error("Signature recovery failed: {0}")]
	Recovery(String),
	#[error("Claimed signer is the zero address")]
	ZeroSigner,
	#[error("Signature recovers to {recovered}, envelope claims {claimed}")]
	SignerMismatch { claimed: Address, recovered: Address },
	#[error("Envelope targets {actual}, relay contract is {expected}")]
	RelayMismatch { expected: Address, actual: Address },
}

/// Chain-level failures while reading state or submitting a relay call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
	/// The relay contract rejected the call.
	#[error("Execution reverted: {0}")]
	Reverted(String),
	/// The envelope was signed for a nonce the contract has already consumed.
	#[error("Meta transaction nonce already used: {signer} is at nonce {current}")]
	NonceAlreadyUsed { signer: Address, current: U256 },
	/// The node answered with a JSON-RPC error that is not a revert.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// The node could not be reached or answered garbage.
	#[error("Transport error: {0}")]
	Transport(String),
	#[error("Transaction {hash} still pending, timed out after {secs}s")]
	PendingTimeout { hash: B256, secs: u64 },
	/// No client could be built for the network.
	#[error("Relay client unavailable: {0}")]
	Unavailable(String),
}
