//! Relay configuration loading.
//!
//! Configuration comes from a single file (TOML, JSON or YAML, picked by
//! extension). `${VAR}` references are substituted from the environment
//! before parsing, then a few well-known `RELAY_*` variables override the
//! parsed values.

use regex::Regex;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

mod types;

pub use types::{RelayConfig, RelaySettings};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Unsupported config format: {0}")]
	UnsupportedFormat(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "RELAY_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<RelayConfig, ConfigError> {
		let file_path = self.file_path.as_deref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;
		info!("Loading configuration from {}", file_path);

		let mut config = self.load_from_file(file_path).await?;
		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<RelayConfig, ConfigError> {
		if !Path::new(file_path).exists() {
			return Err(ConfigError::FileNotFound(file_path.to_string()));
		}
		let content = tokio::fs::read_to_string(file_path).await?;
		let substituted = substitute_env_vars(&content)?;

		let extension = Path::new(file_path)
			.extension()
			.and_then(|s| s.to_str())
			.unwrap_or_default();
		match extension {
			"toml" => parse_toml(&substituted),
			"json" => parse_json(&substituted),
			"yaml" | "yml" => parse_yaml(&substituted),
			_ => Err(ConfigError::UnsupportedFormat(file_path.to_string())),
		}
	}

	fn apply_env_overrides(&self, config: &mut RelayConfig) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			config.relay.log_level = log_level;
		}

		if let Ok(http_port) = env::var(format!("{}HTTP_PORT", self.env_prefix)) {
			config.relay.http_port = http_port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		if let Ok(key) = env::var(format!("{}PRIVATE_KEY", self.env_prefix)) {
			debug!("Overriding private key from environment");
			config.relay.private_key = key;
		}

		Ok(())
	}
}

pub fn parse_toml(contents: &str) -> Result<RelayConfig, ConfigError> {
	toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

pub fn parse_json(contents: &str) -> Result<RelayConfig, ConfigError> {
	serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

pub fn parse_yaml(contents: &str) -> Result<RelayConfig, ConfigError> {
	serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Replaces `${VAR_NAME}` patterns with the variable's value.
///
/// Lines starting with `#` are comments in both TOML and YAML and are left
/// untouched.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = String::with_capacity(content.len());

	for line in content.split_inclusive('\n') {
		if line.trim_start().starts_with('#') {
			result.push_str(line);
			continue;
		}

		let mut substituted = line.to_string();
		for cap in re.captures_iter(line) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			substituted = substituted.replace(full_match, &env_value);
		}
		result.push_str(&substituted);
	}

	Ok(result)
}

/// Checks settings that cannot be expressed in the types.
///
/// Network entries are validated in depth when the network registry is
/// built from them.
pub fn validate_config(config: &RelayConfig) -> Result<(), ConfigError> {
	let key = config.relay.private_key.trim_start_matches("0x");
	if key.len() != 64 || hex::decode(key).is_err() {
		return Err(ConfigError::ValidationError(
			"Private key must be 32 bytes of hex".to_string(),
		));
	}

	if config.networks.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one network must be configured".to_string(),
		));
	}

	if config.relay.receipt_timeout_secs == 0
		|| config.relay.receipt_poll_interval_secs == 0
		|| config.relay.request_timeout_secs == 0
	{
		return Err(ConfigError::ValidationError(
			"Timeouts must be greater than zero".to_string(),
		));
	}

	if config.relay.max_gas_limit == 0 {
		return Err(ConfigError::ValidationError(
			"max_gas_limit must be greater than zero".to_string(),
		));
	}

	Ok(())
}
