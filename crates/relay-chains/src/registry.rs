//! Registry of the networks the relay serves.
//!
//! The `NetworkRegistry` maps the `blockchain` names clients send to the
//! network's connection parameters. It is populated once at startup with
//! [`NetworkRegistry::register`] (or [`NetworkRegistry::from_networks`]) and
//! then shared read-only, so lookups need no synchronization.

use alloy::primitives::Address;
use relay_types::{NetworkConfig, NetworkSummary};
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	#[error("Network name must not be empty")]
	EmptyName,
	#[error("Network {0} already registered")]
	Duplicate(String),
	#[error("Network {network}: invalid relay contract address '{address}'")]
	InvalidAddress { network: String, address: String },
	#[error("Network {network}: RPC URL must start with http:// or https://, got '{url}'")]
	InvalidRpcUrl { network: String, url: String },
}

/// A validated registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredNetwork {
	pub name: String,
	pub config: NetworkConfig,
	/// Parsed form of `config.relay_contract_address`.
	pub relay_contract: Address,
}

impl RegisteredNetwork {
	pub fn summary(&self) -> NetworkSummary {
		NetworkSummary {
			name: self.name.clone(),
			id: self.config.id.clone(),
			relay_contract_address: self.relay_contract.to_string(),
		}
	}
}

/// Networks indexed by name.
#[derive(Default)]
pub struct NetworkRegistry {
	networks: HashMap<String, Arc<RegisteredNetwork>>,
}

impl NetworkRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry from configured networks, validating each entry.
	pub fn from_networks(networks: &HashMap<String, NetworkConfig>) -> Result<Self, RegistryError> {
		let mut registry = Self::new();
		for (name, config) in networks {
			registry.register(name.clone(), config.clone())?;
		}
		Ok(registry)
	}

	/// Registers a network under `name`.
	///
	/// # Errors
	///
	/// Fails on duplicate names, a relay contract address that is not 20
	/// bytes of hex, or an RPC URL that is not HTTP(S).
	pub fn register(
		&mut self,
		name: impl Into<String>,
		config: NetworkConfig,
	) -> Result<(), RegistryError> {
		let name = name.into();
		if name.is_empty() {
			return Err(RegistryError::EmptyName);
		}
		if self.networks.contains_key(&name) {
			return Err(RegistryError::Duplicate(name));
		}

		let relay_contract = parse_contract_address(&config.relay_contract_address).ok_or_else(|| {
			RegistryError::InvalidAddress {
				network: name.clone(),
				address: config.relay_contract_address.clone(),
			}
		})?;

		if !config.rpc_url.starts_with("http://") && !config.rpc_url.starts_with("https://") {
			return Err(RegistryError::InvalidRpcUrl {
				network: name,
				url: config.rpc_url,
			});
		}

		info!(network = %name, id = %config.id, relay = %relay_contract, "Registered network");
		self.networks.insert(
			name.clone(),
			Arc::new(RegisteredNetwork {
				name,
				config,
				relay_contract,
			}),
		);
		Ok(())
	}

	/// Looks a network up by exact, case-sensitive name.
	pub fn resolve(&self, name: &str) -> Option<Arc<RegisteredNetwork>> {
		self.networks.get(name).cloned()
	}

	/// Registered network names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.networks.keys().cloned().collect();
		names.sort();
		names
	}

	/// Public view of every network, sorted by name.
	pub fn summaries(&self) -> Vec<NetworkSummary> {
		self.names()
			.iter()
			.filter_map(|name| self.networks.get(name))
			.map(|network| network.summary())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.networks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.networks.is_empty()
	}
}

impl fmt::Debug for NetworkRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NetworkRegistry")
			.field("networks", &self.names())
			.finish()
	}
}

/// Accepts `0x` followed by exactly 40 hex digits.
fn parse_contract_address(value: &str) -> Option<Address> {
	let digits = value.strip_prefix("0x")?;
	if digits.len() != 40 {
		return None;
	}
	Address::from_str(value).ok()
}
