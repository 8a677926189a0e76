//! Types describing a relay transaction after submission.

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};

/// Receipt of a mined relay transaction.
///
/// Provides information about a transaction after it has been included in a block,
/// including its success status and block number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReceipt {
	/// The hash of the transaction.
	pub tx_hash: B256,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the relay call executed successfully.
	pub success: bool,
}

/// Truncates a transaction hash for log output.
pub fn truncate_hash(hash: &B256) -> String {
	let hash_str = hash.to_string();
	format!("{}..", &hash_str[..10])
}
