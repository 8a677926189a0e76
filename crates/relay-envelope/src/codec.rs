//! Structural decoding of meta-signed transactions.
//!
//! The wire form is the hex encoding of an RLP list describing an unsigned
//! legacy transaction: `[nonce, gasPrice, gasLimit, to, value, data]`,
//! optionally followed by three `v, r, s` placeholders that clients leave in
//! place of a real signature. `data` must be a `relayMetaTx(...)` call.
//!
//! Decoding rejects anything it cannot account for byte by byte. Nothing in
//! the returned envelope is trusted until [`crate::verify`] confirms it.

use alloy::{
	primitives::{Address, Bytes, U256},
	rlp::{Decodable, Header},
	sol_types::SolCall,
};
use relay_types::{DecodeError, MetaEnvelope, MetaSignature, RelayCallParams, WrapperTransaction};

use crate::contracts::ITxRelay;

/// Smallest possible envelope: a `relayMetaTx` call with an empty payload
/// (selector, six head words and the payload length word).
pub const MIN_ENVELOPE_LEN: usize = 4 + 6 * 32 + 32;

/// Fields of an unsigned wrapper transaction.
const UNSIGNED_FIELDS: usize = 6;
/// Fields when the client kept `v, r, s` placeholders.
const PLACEHOLDER_FIELDS: usize = 9;

/// The signer address occupies bytes 16..36 of the payload: the low 20 bytes
/// of the first ABI word after the selector.
const SIGNER_OFFSET: usize = 16;
const SIGNER_END: usize = SIGNER_OFFSET + 20;

/// Decodes a hex meta-signed transaction into its typed parts.
///
/// Accepts an optional `0x` prefix. Any structural problem yields a
/// [`DecodeError`]; no partial envelope is ever returned.
pub fn decode(meta_signed_tx: &str) -> Result<MetaEnvelope, DecodeError> {
	let raw = alloy::hex::decode(meta_signed_tx.trim())
		.map_err(|e| DecodeError::InvalidHex(e.to_string()))?;

	if raw.len() < MIN_ENVELOPE_LEN {
		return Err(DecodeError::TooShort {
			len: raw.len(),
			min: MIN_ENVELOPE_LEN,
		});
	}

	let (wrapper, data) = decode_wrapper(&raw)?;
	let (signature, call) = decode_relay_call(&data)?;

	if call.data.len() < SIGNER_END {
		return Err(DecodeError::PayloadTooShort(call.data.len()));
	}
	let claimed_signer = Address::from_slice(&call.data[SIGNER_OFFSET..SIGNER_END]);

	Ok(MetaEnvelope {
		wrapper,
		signature,
		call,
		claimed_signer,
	})
}

/// ABI encodes the `relayMetaTx` call carried by an envelope.
///
/// This is the calldata the relay puts in its own transaction.
pub fn encode_relay_call(envelope: &MetaEnvelope) -> Bytes {
	ITxRelay::relayMetaTxCall {
		sigV: envelope.signature.v,
		sigR: envelope.signature.r,
		sigS: envelope.signature.s,
		destination: envelope.call.destination,
		data: envelope.call.data.clone(),
		listOwner: envelope.call.whitelist_owner,
	}
	.abi_encode()
	.into()
}

fn rlp_err(err: alloy::rlp::Error) -> DecodeError {
	DecodeError::Rlp(err.to_string())
}

/// Walks the outer RLP list and returns the wrapper fields plus its calldata.
fn decode_wrapper(raw: &[u8]) -> Result<(WrapperTransaction, Bytes), DecodeError> {
	let mut buf = raw;
	let header = Header::decode(&mut buf).map_err(rlp_err)?;
	if !header.list {
		return Err(DecodeError::Rlp("expected a list".into()));
	}
	if buf.len() < header.payload_length {
		return Err(DecodeError::Rlp("list payload truncated".into()));
	}
	if buf.len() > header.payload_length {
		return Err(DecodeError::TrailingBytes);
	}

	let mut fields = buf;
	let nonce = u64::decode(&mut fields).map_err(rlp_err)?;
	let gas_price = u128::decode(&mut fields).map_err(rlp_err)?;
	let gas_limit = u64::decode(&mut fields).map_err(rlp_err)?;

	let to = Bytes::decode(&mut fields).map_err(rlp_err)?;
	if to.len() != 20 {
		return Err(DecodeError::InvalidRecipient(to.len()));
	}
	let to = Address::from_slice(&to);

	let value = U256::decode(&mut fields).map_err(rlp_err)?;
	let data = Bytes::decode(&mut fields).map_err(rlp_err)?;

	// Placeholders carry no information, only their count matters.
	let mut count = UNSIGNED_FIELDS;
	while !fields.is_empty() {
		Bytes::decode(&mut fields).map_err(rlp_err)?;
		count += 1;
	}
	if count != UNSIGNED_FIELDS && count != PLACEHOLDER_FIELDS {
		return Err(DecodeError::FieldCount(count));
	}

	Ok((
		WrapperTransaction {
			nonce,
			gas_price,
			gas_limit,
			to,
			value,
		},
		data,
	))
}

/// Decodes the `relayMetaTx` call, strictly.
fn decode_relay_call(data: &[u8]) -> Result<(MetaSignature, RelayCallParams), DecodeError> {
	let selector = ITxRelay::relayMetaTxCall::SELECTOR;
	match data.get(..selector.len()) {
		Some(found) if found == selector.as_slice() => {}
		Some(found) => return Err(DecodeError::UnknownSelector(hex::encode(found))),
		None => return Err(DecodeError::Abi("calldata shorter than a selector".into())),
	}

	let call = ITxRelay::relayMetaTxCall::abi_decode_validate(data)
		.map_err(|e| DecodeError::Abi(e.to_string()))?;

	Ok((
		MetaSignature {
			v: call.sigV,
			r: call.sigR,
			s: call.sigS,
		},
		RelayCallParams {
			whitelist_owner: call.listOwner,
			destination: call.destination,
			data: call.data,
		},
	))
}
