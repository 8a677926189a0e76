//! Network configuration entries.

use serde::{Deserialize, Serialize};

/// Connection parameters of a named network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
	/// Chain identifier as reported by the node (`net_version`).
	pub id: String,
	/// JSON-RPC endpoint.
	pub rpc_url: String,
	/// Address of the deployed relay contract.
	pub relay_contract_address: String,
}

impl NetworkConfig {
	pub fn new(
		id: impl Into<String>,
		rpc_url: impl Into<String>,
		relay_contract_address: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			rpc_url: rpc_url.into(),
			relay_contract_address: relay_contract_address.into(),
		}
	}
}

/// Public view of a registered network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
	pub name: String,
	pub id: String,
	pub relay_contract_address: String,
}
