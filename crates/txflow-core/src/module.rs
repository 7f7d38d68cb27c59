//! Shared module context.
//!
//! Every method executes against a [`ModuleContext`]: the transports, the
//! read-only transaction defaults, the managed wallet and the configured
//! signer. The context is immutable once built and shared behind an `Arc`.

use crate::methods::registry;
use crate::MethodError;
use std::sync::Arc;
use std::time::Duration;
use txflow_account::{SignerConfig, TransactionSigner, Wallet};
use txflow_config::Config;
use txflow_transport::{RpcTransport, SubscriptionTransport};
use txflow_types::{parse_quantity_u128, Address};

/// Transaction defaults and confirmation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
	pub default_account: Option<Address>,
	pub default_gas: Option<u64>,
	pub default_gas_price: Option<u128>,
	/// Blocks on top of the including block before resolving.
	pub confirmation_blocks: u64,
	/// Headers to wait for a receipt before timing out.
	pub block_timeout: u64,
	/// Head polling period when no subscription transport is set.
	pub polling_interval: Duration,
}

impl Default for ModuleOptions {
	fn default() -> Self {
		Self {
			default_account: None,
			default_gas: None,
			default_gas_price: None,
			confirmation_blocks: 24,
			block_timeout: 50,
			polling_interval: Duration::from_secs(1),
		}
	}
}

impl From<&Config> for ModuleOptions {
	fn from(config: &Config) -> Self {
		let tx = &config.transaction;
		Self {
			default_account: tx.default_account,
			default_gas: tx.default_gas,
			default_gas_price: tx.default_gas_price.map(u128::from),
			confirmation_blocks: tx.confirmation_blocks,
			block_timeout: tx.block_timeout,
			polling_interval: Duration::from_millis(config.rpc.polling_interval_ms),
		}
	}
}

pub struct ModuleContext {
	transport: Arc<dyn RpcTransport>,
	subscriptions: Option<Arc<dyn SubscriptionTransport>>,
	options: ModuleOptions,
	wallet: Wallet,
	signer: SignerConfig,
}

impl ModuleContext {
	pub fn new(transport: Arc<dyn RpcTransport>, options: ModuleOptions) -> Self {
		Self {
			transport,
			subscriptions: None,
			options,
			wallet: Wallet::default(),
			signer: SignerConfig::Default,
		}
	}

	/// Enables `newHeads` subscriptions instead of polling.
	pub fn with_subscriptions(mut self, subscriptions: Arc<dyn SubscriptionTransport>) -> Self {
		self.subscriptions = Some(subscriptions);
		self
	}

	pub fn with_wallet(mut self, wallet: Wallet) -> Self {
		self.wallet = wallet;
		self
	}

	/// Signs every non-wallet sender with `signer` instead of the node.
	pub fn with_signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
		self.signer = SignerConfig::External(signer);
		self
	}

	pub fn transport(&self) -> &Arc<dyn RpcTransport> {
		&self.transport
	}

	pub fn subscriptions(&self) -> Option<&Arc<dyn SubscriptionTransport>> {
		self.subscriptions.as_ref()
	}

	pub fn options(&self) -> &ModuleOptions {
		&self.options
	}

	pub fn wallet(&self) -> &Wallet {
		&self.wallet
	}

	pub fn signer(&self) -> &SignerConfig {
		&self.signer
	}

	/// Current gas price estimate from `eth_gasPrice`.
	pub async fn gas_price(&self) -> Result<u128, MethodError> {
		let value = self
			.transport
			.call(registry::GET_GAS_PRICE.rpc_method, Vec::new())
			.await?;
		Ok(parse_quantity_u128(&value)?)
	}
}
