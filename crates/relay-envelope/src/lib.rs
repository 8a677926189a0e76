//! Meta-transaction envelope handling.
//!
//! This crate turns the hex string a client submits into a typed
//! [`MetaEnvelope`](relay_types::MetaEnvelope) and decides whether the
//! envelope was really authorized by the signer it claims. Both steps are
//! pure: nothing here talks to a node.
//!
//! - `codec`: structural decoding (hex, RLP wrapper, `relayMetaTx` ABI call)
//! - `verifier`: canonical digest and signature recovery
//! - `contracts`: Solidity bindings of the relay contract

pub mod codec;
pub mod contracts;
pub mod verifier;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use codec::{decode, encode_relay_call, MIN_ENVELOPE_LEN};
pub use verifier::{relay_digest, verify, VerificationContext};
