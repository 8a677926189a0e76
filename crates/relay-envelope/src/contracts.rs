//! Solidity bindings of the relay contract.

use alloy::sol;

// Relay contract (TxRelay). `relayMetaTx` checks the meta signature against
// `keccak256(0x19 0x00 relay listOwner nonce destination data)`, bumps the
// signer's nonce and forwards `data` to `destination`.
sol! {
	#[sol(rpc)]
	interface ITxRelay {
		function relayMetaTx(
			uint8 sigV,
			bytes32 sigR,
			bytes32 sigS,
			address destination,
			bytes data,
			address listOwner
		) external;

		function getNonce(address add) external view returns (uint256);
	}
}
