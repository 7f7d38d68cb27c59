//! Configuration module for the txflow pipeline.
//!
//! This module loads the module-level settings the submission operation and
//! the confirmation workflow read: the node endpoint, transaction defaults,
//! confirmation depth and timeout, and the managed wallet keys. Configuration
//! is TOML with `${VAR}` and `${VAR:-default}` environment substitution.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use txflow_types::{Address, PrivateKey};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Node endpoint settings.
	pub rpc: RpcConfig,
	/// Defaults applied to outgoing transactions and confirmation policy.
	#[serde(default)]
	pub transaction: TransactionConfig,
	/// Managed wallet accounts.
	#[serde(default)]
	pub account: AccountConfig,
}

/// Node endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcConfig {
	/// JSON-RPC HTTP endpoint.
	pub url: String,
	/// Interval between `eth_blockNumber` polls when no subscription
	/// transport is available. Defaults to 1000 ms.
	#[serde(default = "default_polling_interval_ms")]
	pub polling_interval_ms: u64,
}

/// Transaction defaults and confirmation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionConfig {
	/// Sender used when a request omits `from`.
	pub default_account: Option<Address>,
	/// Gas limit used when a request omits `gas`.
	pub default_gas: Option<u64>,
	/// Gas price in wei used when a request omits `gasPrice`. When unset the
	/// node's `eth_gasPrice` estimate is used.
	pub default_gas_price: Option<u64>,
	/// Blocks required on top of the including block before a transaction
	/// counts as confirmed. Defaults to 24.
	#[serde(default = "default_confirmation_blocks")]
	pub confirmation_blocks: u64,
	/// Blocks to wait for a receipt before giving up. Defaults to 50.
	#[serde(default = "default_block_timeout")]
	pub block_timeout: u64,
}

impl Default for TransactionConfig {
	fn default() -> Self {
		Self {
			default_account: None,
			default_gas: None,
			default_gas_price: None,
			confirmation_blocks: default_confirmation_blocks(),
			block_timeout: default_block_timeout(),
		}
	}
}

/// Managed wallet accounts.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex private keys; the wallet indexes them by derived address.
	#[serde(default)]
	pub private_keys: Vec<PrivateKey>,
}

/// Largest confirmation target whose events fit the per-transaction event
/// buffer, so subscribers never skip a confirmation.
pub const MAX_CONFIRMATION_BLOCKS: u64 = 4093;

fn default_polling_interval_ms() -> u64 {
	1000
}

fn default_confirmation_blocks() -> u64 {
	24
}

fn default_block_timeout() -> u64 {
	50
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				}
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	/// Validates the configuration.
	///
	/// - The RPC url must be an http(s) endpoint
	/// - The polling interval must be positive
	/// - The block timeout must be positive
	/// - The confirmation target must not exceed [`MAX_CONFIRMATION_BLOCKS`]
	/// - Private keys must be non-empty
	fn validate(&self) -> Result<(), ConfigError> {
		let url = self.rpc.url.trim();
		if url.is_empty() {
			return Err(ConfigError::Validation("RPC url cannot be empty".into()));
		}
		if !["http://", "https://"]
			.iter()
			.any(|scheme| url.starts_with(scheme))
		{
			return Err(ConfigError::Validation(format!(
				"RPC url '{}' must use http or https",
				url
			)));
		}
		if self.rpc.polling_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"rpc.polling_interval_ms must be greater than 0".into(),
			));
		}
		if self.transaction.block_timeout == 0 {
			return Err(ConfigError::Validation(
				"transaction.block_timeout must be greater than 0".into(),
			));
		}
		if self.transaction.confirmation_blocks > MAX_CONFIRMATION_BLOCKS {
			return Err(ConfigError::Validation(format!(
				"transaction.confirmation_blocks must be at most {}",
				MAX_CONFIRMATION_BLOCKS
			)));
		}
		if let Some(index) = self
			.account
			.private_keys
			.iter()
			.position(PrivateKey::is_empty)
		{
			return Err(ConfigError::Validation(format!(
				"account.private_keys[{}] cannot be empty",
				index
			)));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
