//! JSON-RPC transport module for the txflow pipeline.
//!
//! This module defines the request/response capability every method executes
//! through, and the optional subscription capability the head watcher uses
//! when the node can push `newHeads` notifications. An HTTP implementation is
//! provided; anything else (sockets, in-process nodes, test doubles) plugs in
//! by implementing the traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

pub use implementations::http::HttpTransport;

/// JSON-RPC internal error code, used for failures below the protocol layer.
pub const INTERNAL_ERROR: i64 = -32603;

/// Error returned by the node, or raised by the transport on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
	/// JSON-RPC error code.
	pub code: i64,
	/// Human readable message.
	pub message: String,
}

impl RpcError {
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	/// Wraps a connection or decoding failure.
	pub fn transport(message: impl Into<String>) -> Self {
		Self::new(INTERNAL_ERROR, message)
	}
}

/// Request/response capability.
#[async_trait]
pub trait RpcTransport: Send + Sync {
	/// Sends one JSON-RPC request and returns its `result` member.
	async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// A live `eth_subscribe` subscription.
#[derive(Debug)]
pub struct Subscription {
	/// Identifier the node assigned; needed to unsubscribe.
	pub id: String,
	/// Notification payloads in arrival order.
	pub notifications: mpsc::Receiver<Value>,
}

/// Push notification capability.
#[async_trait]
pub trait SubscriptionTransport: Send + Sync {
	/// Opens a subscription, e.g. with params `["newHeads"]`.
	async fn subscribe(&self, params: Vec<Value>) -> Result<Subscription, RpcError>;

	/// Releases the subscription with the given id.
	async fn unsubscribe(&self, id: &str) -> Result<(), RpcError>;
}
