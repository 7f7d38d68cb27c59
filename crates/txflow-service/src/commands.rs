//! Subcommand implementations.

use clap::Args as ClapArgs;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use tokio_stream::StreamExt;
use txflow_account::Wallet;
use txflow_config::Config;
use txflow_core::{
	MethodError, MethodFactory, MethodOutput, ModuleContext, ModuleOptions, TransactionEvent,
};
use txflow_transport::HttpTransport;
use txflow_types::{truncate_id, Address, U256};

#[derive(ClapArgs, Debug)]
pub struct SendArgs {
	/// Sender; defaults to `transaction.default_account`
	#[arg(long)]
	pub from: Option<Address>,
	/// Recipient; omit to deploy `--data` as a contract
	#[arg(long)]
	pub to: Option<Address>,
	/// Value in wei, decimal or 0x-prefixed hex
	#[arg(long)]
	pub value: Option<String>,
	/// Call data as hex
	#[arg(long)]
	pub data: Option<String>,
	#[arg(long)]
	pub gas: Option<u64>,
	/// Gas price in wei
	#[arg(long)]
	pub gas_price: Option<u128>,
	#[arg(long)]
	pub nonce: Option<u64>,
	/// Overrides `transaction.confirmation_blocks`
	#[arg(long)]
	pub confirmations: Option<u64>,
}

/// Loads the configuration and assembles the module around an HTTP
/// transport and the configured wallet.
pub async fn load_module(
	path: &Path,
	confirmations: Option<u64>,
) -> Result<Arc<ModuleContext>, Box<dyn std::error::Error>> {
	let config = Config::from_file(path).await?;
	tracing::info!(url = %config.rpc.url, "Loaded configuration");

	let wallet = Wallet::from_private_keys(config.account.private_keys.iter().cloned())?;
	if !wallet.is_empty() {
		tracing::info!(accounts = wallet.len(), "Managed wallet loaded");
	}

	let mut options = ModuleOptions::from(&config);
	if let Some(confirmations) = confirmations {
		options.confirmation_blocks = confirmations;
	}

	let transport = Arc::new(HttpTransport::new(config.rpc.url.clone()));
	Ok(Arc::new(
		ModuleContext::new(transport, options).with_wallet(wallet),
	))
}

pub fn list_methods() {
	let factory = MethodFactory::default();
	for name in factory.method_names() {
		if let Ok(method) = factory.create_method(name) {
			let descriptor = method.descriptor();
			println!(
				"{:<24} {:<28} {:?}",
				name, descriptor.rpc_method, descriptor.kind
			);
		}
	}
}

pub async fn call(
	module: &Arc<ModuleContext>,
	name: &str,
	params: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
	let mut method = MethodFactory::default().create_method(name)?;
	method.set_parameters(params.iter().map(|p| parse_param(p)).collect());

	match method.execute(module).await? {
		MethodOutput::Value(value) => println!("{}", serde_json::to_string_pretty(&value)?),
		MethodOutput::Pending(pending) => {
			let receipt = pending.await?;
			println!("{}", serde_json::to_string_pretty(&receipt)?);
		}
	}
	Ok(())
}

pub async fn send(
	module: &Arc<ModuleContext>,
	args: &SendArgs,
) -> Result<(), Box<dyn std::error::Error>> {
	let mut method = MethodFactory::default().create_method("sendTransaction")?;
	method.set_parameters(vec![build_request(args)?]);

	let MethodOutput::Pending(mut pending) = method.execute(module).await? else {
		return Err(MethodError::InvalidParameters("sendTransaction returned a value".into()).into());
	};

	let mut events = pending.events();
	let progress = tokio::spawn(async move {
		while let Some(event) = events.next().await {
			match event {
				TransactionEvent::TransactionHash(hash) => {
					tracing::info!(tx_hash = %hash, "Transaction accepted by node");
				}
				TransactionEvent::Confirmation { count, receipt } => {
					tracing::info!(
						tx_hash = %truncate_id(&receipt.transaction_hash.to_string()),
						confirmations = count,
						"Confirmation"
					);
				}
				TransactionEvent::Receipt(_) | TransactionEvent::Error(_) => {}
			}
		}
	});

	let outcome = pending.await;
	let _ = progress.await;
	let receipt = outcome?;
	println!("{}", serde_json::to_string_pretty(&receipt)?);
	Ok(())
}

/// Builds the `sendTransaction` parameter object from the flags.
fn build_request(args: &SendArgs) -> Result<Value, MethodError> {
	let mut request = Map::new();
	if let Some(from) = args.from {
		request.insert("from".into(), json!(from));
	}
	if let Some(to) = args.to {
		request.insert("to".into(), json!(to));
	}
	if let Some(value) = &args.value {
		let value: U256 = value
			.parse()
			.map_err(|_| MethodError::InvalidParameters(format!("invalid value: {}", value)))?;
		request.insert("value".into(), json!(value));
	}
	if let Some(data) = &args.data {
		request.insert("data".into(), json!(data));
	}
	if let Some(gas) = args.gas {
		request.insert("gas".into(), json!(format!("{:#x}", gas)));
	}
	if let Some(gas_price) = args.gas_price {
		request.insert("gasPrice".into(), json!(format!("{:#x}", gas_price)));
	}
	if let Some(nonce) = args.nonce {
		request.insert("nonce".into(), json!(format!("{:#x}", nonce)));
	}
	Ok(Value::Object(request))
}

/// JSON when it parses, a plain string otherwise.
fn parse_param(param: &str) -> Value {
	serde_json::from_str(param).unwrap_or_else(|_| Value::String(param.to_string()))
}
