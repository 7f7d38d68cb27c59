//! Block head delivery.
//!
//! With a subscription transport the watcher opens an `eth_subscribe`
//! `newHeads` subscription. Without one it polls `eth_blockNumber` on the
//! module's polling interval and fetches every new header with
//! `eth_getBlockByNumber`, delivering them in height order.

use crate::methods::registry;
use crate::module::ModuleContext;
use crate::MethodError;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use txflow_transport::{RpcTransport, SubscriptionTransport};
use txflow_types::{parse_quantity, BlockHeader};

const POLLING_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct NewHeadsWatcher;

impl NewHeadsWatcher {
	/// Starts delivering headers. The returned subscription must be released
	/// with [`HeadSubscription::unsubscribe`].
	pub async fn watch(&self, module: &ModuleContext) -> Result<HeadSubscription, MethodError> {
		match module.subscriptions() {
			Some(transport) => {
				let subscription = transport.subscribe(vec![json!("newHeads")]).await?;
				tracing::debug!(subscription = %subscription.id, "Subscribed to newHeads");
				Ok(HeadSubscription {
					inner: Inner::Socket {
						id: subscription.id,
						notifications: subscription.notifications,
						transport: Arc::clone(transport),
					},
				})
			}
			None => {
				let (sender, headers) = mpsc::channel(POLLING_BUFFER);
				let task = tokio::spawn(poll_heads(
					Arc::clone(module.transport()),
					module.options().polling_interval,
					sender,
				));
				tracing::debug!("Polling for new heads");
				Ok(HeadSubscription {
					inner: Inner::Polling { headers, task },
				})
			}
		}
	}
}

/// A stream of block headers owned by one workflow run.
pub struct HeadSubscription {
	inner: Inner,
}

enum Inner {
	Socket {
		id: String,
		notifications: mpsc::Receiver<Value>,
		transport: Arc<dyn SubscriptionTransport>,
	},
	Polling {
		headers: mpsc::Receiver<BlockHeader>,
		task: JoinHandle<()>,
	},
}

impl HeadSubscription {
	/// Next header, or `None` once the source has closed.
	pub async fn next(&mut self) -> Option<BlockHeader> {
		match &mut self.inner {
			Inner::Socket { notifications, .. } => loop {
				let notification = notifications.recv().await?;
				match serde_json::from_value(notification) {
					Ok(header) => return Some(header),
					Err(e) => tracing::warn!(error = %e, "Ignoring malformed newHeads notification"),
				}
			},
			Inner::Polling { headers, .. } => headers.recv().await,
		}
	}

	/// Releases the subscription. Failures are logged, not returned.
	pub async fn unsubscribe(self) {
		match self.inner {
			Inner::Socket { id, transport, .. } => {
				if let Err(e) = transport.unsubscribe(&id).await {
					tracing::warn!(subscription = %id, error = %e, "Failed to unsubscribe from newHeads");
				}
			}
			Inner::Polling { task, .. } => task.abort(),
		}
	}
}

async fn poll_heads(
	transport: Arc<dyn RpcTransport>,
	period: Duration,
	sender: mpsc::Sender<BlockHeader>,
) {
	let mut interval = tokio::time::interval(period);
	interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
	let mut last: Option<u64> = None;

	loop {
		interval.tick().await;

		let current = match latest_block_number(transport.as_ref()).await {
			Ok(number) => number,
			Err(e) => {
				tracing::warn!(error = %e, "Failed to poll block number");
				continue;
			}
		};

		let first = match last {
			Some(last) if current <= last => continue,
			Some(last) => last + 1,
			None => current,
		};

		for number in first..=current {
			match block_header(transport.as_ref(), number).await {
				Ok(Some(header)) => {
					last = Some(number);
					if sender.send(header).await.is_err() {
						return;
					}
				}
				Ok(None) => break,
				Err(e) => {
					tracing::warn!(block = number, error = %e, "Failed to fetch block header");
					break;
				}
			}
		}
	}
}

async fn latest_block_number(transport: &dyn RpcTransport) -> Result<u64, MethodError> {
	let value = transport
		.call(registry::GET_BLOCK_NUMBER.rpc_method, Vec::new())
		.await?;
	Ok(parse_quantity(&value)?)
}

async fn block_header(
	transport: &dyn RpcTransport,
	number: u64,
) -> Result<Option<BlockHeader>, MethodError> {
	let value = transport
		.call(
			registry::GET_BLOCK_BY_NUMBER.rpc_method,
			vec![json!(format!("{:#x}", number)), json!(false)],
		)
		.await?;
	if value.is_null() {
		return Ok(None);
	}
	serde_json::from_value(value)
		.map(Some)
		.map_err(|e| MethodError::Decode(format!("block header: {}", e)))
}
