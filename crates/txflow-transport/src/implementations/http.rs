//! HTTP JSON-RPC transport.
//!
//! Plain request/response over reqwest. HTTP cannot carry subscriptions, so
//! modules built on this transport fall back to polling for new heads.

use crate::{RpcError, RpcTransport};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Serialize)]
struct Request<'a> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: Vec<Value>,
}

/// JSON-RPC 2.0 client over HTTP.
pub struct HttpTransport {
	client: reqwest::Client,
	url: String,
	next_id: AtomicU64,
}

impl HttpTransport {
	pub fn new(url: impl Into<String>) -> Self {
		Self::with_client(reqwest::Client::new(), url)
	}

	/// Uses a preconfigured client, e.g. with custom timeouts.
	pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
		Self {
			client,
			url: url.into(),
			next_id: AtomicU64::new(1),
		}
	}

	pub fn url(&self) -> &str {
		&self.url
	}
}

#[async_trait]
impl RpcTransport for HttpTransport {
	async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		tracing::debug!(id, method, "Sending RPC request");

		let response = self
			.client
			.post(&self.url)
			.json(&Request {
				jsonrpc: "2.0",
				id,
				method,
				params,
			})
			.send()
			.await
			.map_err(|e| RpcError::transport(format!("Request failed: {}", e)))?;

		let status = response.status();
		let body: Value = response.json().await.map_err(|e| {
			RpcError::transport(format!("Invalid response body (HTTP {}): {}", status, e))
		})?;

		parse_response(body)
	}
}

/// Extracts `result`, or converts the `error` member into an [`RpcError`].
pub(crate) fn parse_response(mut body: Value) -> Result<Value, RpcError> {
	if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
		let code = error
			.get("code")
			.and_then(Value::as_i64)
			.unwrap_or(crate::INTERNAL_ERROR);
		let message = error
			.get("message")
			.and_then(Value::as_str)
			.unwrap_or("unknown error")
			.to_string();
		return Err(RpcError::new(code, message));
	}

	match body.get_mut("result") {
		Some(result) => Ok(result.take()),
		None => Err(RpcError::transport("Response has neither result nor error")),
	}
}
