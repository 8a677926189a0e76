//! Configuration structures.

use relay_types::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root of the relay configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
	pub relay: RelaySettings,
	/// Supported networks keyed by the name clients pass as `blockchain`.
	#[serde(default)]
	pub networks: HashMap<String, NetworkConfig>,
}

/// Service-wide settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelaySettings {
	#[serde(default = "default_http_host")]
	pub http_host: String,
	#[serde(default = "default_http_port")]
	pub http_port: u16,
	/// Hex private key of the funded account that pays for relayed calls.
	pub private_key: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Wait for the receipt before answering a relay request.
	#[serde(default)]
	pub wait_for_receipt: bool,
	#[serde(default = "default_receipt_timeout_secs")]
	pub receipt_timeout_secs: u64,
	#[serde(default = "default_receipt_poll_interval_secs")]
	pub receipt_poll_interval_secs: u64,
	/// Upper bound on the gas limit of relay transactions.
	#[serde(default = "default_max_gas_limit")]
	pub max_gas_limit: u64,
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}

impl std::fmt::Debug for RelaySettings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RelaySettings")
			.field("http_host", &self.http_host)
			.field("http_port", &self.http_port)
			.field("private_key", &"<redacted>")
			.field("log_level", &self.log_level)
			.field("wait_for_receipt", &self.wait_for_receipt)
			.field("receipt_timeout_secs", &self.receipt_timeout_secs)
			.field("receipt_poll_interval_secs", &self.receipt_poll_interval_secs)
			.field("max_gas_limit", &self.max_gas_limit)
			.field("request_timeout_secs", &self.request_timeout_secs)
			.finish()
	}
}

fn default_http_host() -> String {
	"0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
	3000
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_receipt_timeout_secs() -> u64 {
	120
}

fn default_receipt_poll_interval_secs() -> u64 {
	2
}

fn default_max_gas_limit() -> u64 {
	3_000_000
}

fn default_request_timeout_secs() -> u64 {
	60
}
