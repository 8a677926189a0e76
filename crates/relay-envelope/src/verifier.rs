//! Meta signature verification.
//!
//! The relay contract authenticates a meta transaction by recovering the
//! signer of
//!
//! ```text
//! keccak256(0x19 ‖ 0x00 ‖ relay ‖ listOwner ‖ nonce ‖ destination ‖ data)
//! ```
//!
//! and comparing it with the address in the first word of `data`. We do the
//! same check off-chain so that forged envelopes never cost the relay gas.
//! The nonce is the signer's current meta nonce, read from the contract by
//! the caller and passed in through [`VerificationContext`].

use alloy::primitives::{keccak256, uint, Address, Signature, B256, U256};
use relay_types::{MetaEnvelope, MetaSignature, RelayCallParams, VerificationError};

/// Order of the secp256k1 group.
const SECP256K1N: U256 =
	uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Chain state an envelope is verified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationContext {
	/// Relay contract of the target network.
	pub relay_contract: Address,
	/// Meta nonce the signature must commit to.
	pub nonce: U256,
}

impl VerificationContext {
	pub fn new(relay_contract: Address, nonce: U256) -> Self {
		Self {
			relay_contract,
			nonce,
		}
	}
}

/// Digest the meta signature is computed over.
pub fn relay_digest(relay_contract: Address, call: &RelayCallParams, nonce: U256) -> B256 {
	let mut preimage = Vec::with_capacity(2 + 20 + 20 + 32 + 20 + call.data.len());
	preimage.extend_from_slice(&[0x19, 0x00]);
	preimage.extend_from_slice(relay_contract.as_slice());
	preimage.extend_from_slice(call.whitelist_owner.as_slice());
	preimage.extend_from_slice(&nonce.to_be_bytes::<32>());
	preimage.extend_from_slice(call.destination.as_slice());
	preimage.extend_from_slice(&call.data);
	keccak256(&preimage)
}

/// Confirms that `envelope` was signed by the address it claims.
///
/// Returns the recovered signer. Fails closed: any malformed signature
/// component, any mismatch, and any recovery error is a
/// [`VerificationError`].
pub fn verify(
	envelope: &MetaEnvelope,
	context: &VerificationContext,
) -> Result<Address, VerificationError> {
	if envelope.wrapper.to != context.relay_contract {
		return Err(VerificationError::RelayMismatch {
			expected: context.relay_contract,
			actual: envelope.wrapper.to,
		});
	}
	if envelope.claimed_signer.is_zero() {
		return Err(VerificationError::ZeroSigner);
	}

	let signature = parse_signature(&envelope.signature)?;
	let digest = relay_digest(context.relay_contract, &envelope.call, context.nonce);
	let recovered = signature
		.recover_address_from_prehash(&digest)
		.map_err(|e| VerificationError::Recovery(e.to_string()))?;

	if recovered != envelope.claimed_signer {
		tracing::debug!(
			claimed = %envelope.claimed_signer,
			recovered = %recovered,
			"Meta signature does not match claimed signer"
		);
		return Err(VerificationError::SignerMismatch {
			claimed: envelope.claimed_signer,
			recovered,
		});
	}

	Ok(recovered)
}

fn parse_signature(signature: &MetaSignature) -> Result<Signature, VerificationError> {
	// Contracts use 27/28, some signers emit the raw parity bit.
	let y_parity = match signature.v {
		0 | 27 => false,
		1 | 28 => true,
		other => return Err(VerificationError::InvalidRecoveryId(other)),
	};

	let r = U256::from_be_bytes(signature.r.0);
	let s = U256::from_be_bytes(signature.s.0);
	if r.is_zero() || r >= SECP256K1N {
		return Err(VerificationError::ComponentOutOfRange("r"));
	}
	if s.is_zero() || s >= SECP256K1N {
		return Err(VerificationError::ComponentOutOfRange("s"));
	}

	Ok(Signature::new(r, s, y_parity))
}
