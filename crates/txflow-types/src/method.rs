//! Static RPC method descriptors.
//!
//! Descriptors are defined once in a registry table and never mutated. The
//! method factory uses the [`MethodKind`] to decide which dependencies a method
//! instance is constructed with.

use serde::{Deserialize, Serialize};

/// How a method is constructed and executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
	/// One-shot request/response call.
	Call,
	/// Submits a transaction and tracks it with a confirmation workflow.
	Send,
	/// `eth_sendTransaction`, which additionally owns the raw-send, chain-id
	/// and nonce helpers of the signing path.
	SendTransaction,
}

/// Metadata of a single RPC method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
	/// JSON-RPC method name, e.g. `eth_chainId`.
	pub rpc_method: &'static str,
	/// Number of positional parameters the method expects.
	pub parameters: usize,
	/// Construction shape.
	pub kind: MethodKind,
}

impl MethodDescriptor {
	pub const fn call(rpc_method: &'static str, parameters: usize) -> Self {
		Self {
			rpc_method,
			parameters,
			kind: MethodKind::Call,
		}
	}

	pub const fn send(rpc_method: &'static str, parameters: usize) -> Self {
		Self {
			rpc_method,
			parameters,
			kind: MethodKind::Send,
		}
	}

	pub const fn send_transaction(rpc_method: &'static str, parameters: usize) -> Self {
		Self {
			rpc_method,
			parameters,
			kind: MethodKind::SendTransaction,
		}
	}
}
