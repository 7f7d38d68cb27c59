//! In-memory node doubles shared by the pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use txflow_account::{SigningError, TransactionSigner};
use txflow_core::{ModuleContext, ModuleOptions};
use txflow_transport::{RpcError, RpcTransport, Subscription, SubscriptionTransport};
use txflow_types::{Address, PrivateKey, SignedTransaction, TransactionRequest, B256};

pub const WALLET_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const WALLET_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

pub fn tx_hash() -> B256 {
	B256::repeat_byte(0xaa)
}

pub fn wallet_address() -> Address {
	WALLET_ADDRESS.parse().unwrap()
}

pub fn foreign_address() -> Address {
	Address::repeat_byte(0x11)
}

/// Answers each RPC method from a queue; the last queued answer repeats.
#[derive(Default)]
pub struct MockTransport {
	responses: Mutex<HashMap<String, VecDeque<Result<Value, RpcError>>>>,
	calls: Mutex<Vec<(String, Vec<Value>)>>,
	gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl MockTransport {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn respond(&self, method: &str, value: Value) {
		self.push(method, Ok(value));
	}

	pub fn fail(&self, method: &str, error: RpcError) {
		self.push(method, Err(error));
	}

	fn push(&self, method: &str, response: Result<Value, RpcError>) {
		self.responses
			.lock()
			.unwrap()
			.entry(method.to_string())
			.or_default()
			.push_back(response);
	}

	/// Holds every `method` call until the returned gate is notified.
	pub fn hold(&self, method: &str) -> Arc<Notify> {
		let gate = Arc::new(Notify::new());
		self.gates
			.lock()
			.unwrap()
			.insert(method.to_string(), gate.clone());
		gate
	}

	pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
		self.calls.lock().unwrap().clone()
	}

	pub fn count(&self, method: &str) -> usize {
		self.calls().iter().filter(|(m, _)| m == method).count()
	}

	pub fn methods(&self) -> Vec<String> {
		self.calls().into_iter().map(|(method, _)| method).collect()
	}

	pub fn params(&self, method: &str) -> Vec<Vec<Value>> {
		self.calls()
			.into_iter()
			.filter(|(m, _)| m == method)
			.map(|(_, params)| params)
			.collect()
	}
}

#[async_trait]
impl RpcTransport for MockTransport {
	async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
		self.calls
			.lock()
			.unwrap()
			.push((method.to_string(), params));

		let gate = self.gates.lock().unwrap().get(method).cloned();
		if let Some(gate) = gate {
			gate.notified().await;
		}

		let mut responses = self.responses.lock().unwrap();
		let queue = responses
			.get_mut(method)
			.ok_or_else(|| RpcError::new(-32601, format!("the method {} does not exist", method)))?;
		match queue.len() {
			0 => Err(RpcError::new(-32601, "no response configured")),
			1 => queue[0].clone(),
			_ => queue.pop_front().unwrap_or(Err(RpcError::transport("empty"))),
		}
	}
}

/// Producer end of one `newHeads` subscription.
pub struct HeadFeed {
	pub id: String,
	sender: mpsc::Sender<Value>,
}

impl HeadFeed {
	/// Delivers header `number`; false once the subscriber is gone.
	pub async fn push(&self, number: u64) -> bool {
		self.sender.send(header_json(number)).await.is_ok()
	}

	pub async fn push_raw(&self, value: Value) -> bool {
		self.sender.send(value).await.is_ok()
	}
}

pub struct MockSubscriptions {
	feeds: mpsc::UnboundedSender<HeadFeed>,
	opened: tokio::sync::Mutex<mpsc::UnboundedReceiver<HeadFeed>>,
	unsubscribed: Mutex<Vec<String>>,
	next_id: Mutex<u64>,
}

impl MockSubscriptions {
	pub fn new() -> Arc<Self> {
		let (feeds, opened) = mpsc::unbounded_channel();
		Arc::new(Self {
			feeds,
			opened: tokio::sync::Mutex::new(opened),
			unsubscribed: Mutex::new(Vec::new()),
			next_id: Mutex::new(0),
		})
	}

	/// Waits until the pipeline opens its next subscription.
	pub async fn next_feed(&self) -> HeadFeed {
		tokio::time::timeout(Duration::from_secs(5), self.opened.lock().await.recv())
			.await
			.expect("no subscription opened")
			.expect("subscription channel closed")
	}

	pub fn unsubscribed(&self) -> Vec<String> {
		self.unsubscribed.lock().unwrap().clone()
	}
}

#[async_trait]
impl SubscriptionTransport for MockSubscriptions {
	async fn subscribe(&self, params: Vec<Value>) -> Result<Subscription, RpcError> {
		assert_eq!(params, vec![json!("newHeads")]);
		let id = {
			let mut next = self.next_id.lock().unwrap();
			*next += 1;
			format!("0x{:x}", *next)
		};
		let (sender, notifications) = mpsc::channel(64);
		self.feeds
			.send(HeadFeed {
				id: id.clone(),
				sender,
			})
			.map_err(|_| RpcError::transport("test finished"))?;
		Ok(Subscription { id, notifications })
	}

	async fn unsubscribe(&self, id: &str) -> Result<(), RpcError> {
		self.unsubscribed.lock().unwrap().push(id.to_string());
		Ok(())
	}
}

/// External signer that records every request it signs.
#[derive(Default)]
pub struct RecordingSigner {
	pub signed: Mutex<Vec<TransactionRequest>>,
	pub keys_seen: Mutex<Vec<bool>>,
	/// RPC methods the node had seen when each signature was made.
	pub node_calls_at_sign: Mutex<Vec<Vec<String>>>,
	transport: Option<Arc<MockTransport>>,
}

impl RecordingSigner {
	pub fn raw() -> Vec<u8> {
		vec![0xde, 0xad, 0xbe, 0xef]
	}

	pub fn observing(transport: &Arc<MockTransport>) -> Self {
		Self {
			transport: Some(transport.clone()),
			..Self::default()
		}
	}
}

#[async_trait]
impl TransactionSigner for RecordingSigner {
	async fn sign(
		&self,
		request: &TransactionRequest,
		private_key: Option<&PrivateKey>,
	) -> Result<SignedTransaction, SigningError> {
		self.signed.lock().unwrap().push(request.clone());
		self.keys_seen.lock().unwrap().push(private_key.is_some());
		if let Some(transport) = &self.transport {
			self.node_calls_at_sign
				.lock()
				.unwrap()
				.push(transport.methods());
		}
		Ok(SignedTransaction {
			raw_transaction: Self::raw().into(),
			transaction_hash: tx_hash(),
			request: request.clone(),
		})
	}
}

pub fn header_json(number: u64) -> Value {
	json!({
		"number": format!("{:#x}", number),
		"hash": B256::with_last_byte(number as u8),
		"parentHash": B256::with_last_byte(number.saturating_sub(1) as u8),
		"timestamp": "0x64"
	})
}

pub fn receipt_json(status: u64, gas_used: u64) -> Value {
	json!({
		"transactionHash": tx_hash(),
		"blockNumber": "0x10",
		"blockHash": B256::repeat_byte(0xbb),
		"status": format!("{:#x}", status),
		"gasUsed": format!("{:#x}", gas_used),
		"from": WALLET_ADDRESS,
		"to": RECIPIENT,
		"logs": []
	})
}

pub fn options(confirmation_blocks: u64, block_timeout: u64) -> ModuleOptions {
	ModuleOptions {
		confirmation_blocks,
		block_timeout,
		polling_interval: Duration::from_millis(100),
		..ModuleOptions::default()
	}
}

/// Makes the mock node accept any submission and answer the helper lookups.
pub fn node_defaults(transport: &MockTransport) {
	transport.respond("eth_sendTransaction", json!(tx_hash()));
	transport.respond("eth_sendRawTransaction", json!(tx_hash()));
	transport.respond("eth_chainId", json!("0x539"));
	transport.respond("eth_getTransactionCount", json!("0x7"));
	transport.respond("eth_gasPrice", json!("0x3b9aca00"));
}

/// Module on top of [`node_defaults`] with `newHeads` subscriptions.
pub fn module(
	transport: &Arc<MockTransport>,
	subscriptions: &Arc<MockSubscriptions>,
	options: ModuleOptions,
) -> ModuleContext {
	node_defaults(transport);
	ModuleContext::new(transport.clone(), options).with_subscriptions(subscriptions.clone())
}

pub fn transfer_from(from: Address) -> Value {
	json!({
		"from": from,
		"to": RECIPIENT,
		"value": "0xde0b6b3a7640000",
		"gas": "0x5208"
	})
}

/// Builds `sendTransaction` through the factory and executes it.
pub async fn send_transaction(
	module: &Arc<ModuleContext>,
	request: Value,
) -> Result<txflow_core::PendingTransaction, txflow_core::MethodError> {
	let mut method = txflow_core::MethodFactory::default().create_method("sendTransaction")?;
	method.set_parameters(vec![request]);
	match method.execute(module).await? {
		txflow_core::MethodOutput::Pending(pending) => Ok(pending),
		txflow_core::MethodOutput::Value(value) => panic!("unexpected call output {}", value),
	}
}
