//! Transaction receipt types.
//!
//! Receipts are the node's record of a transaction's inclusion. They are
//! absent until the transaction is mined and are never modified afterwards by
//! this crate.

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Event log emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
	/// Contract address that emitted the log.
	pub address: Address,
	/// Indexed event parameters.
	#[serde(default)]
	pub topics: Vec<B256>,
	/// Non-indexed event data.
	#[serde(default)]
	pub data: Bytes,
}

/// Transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub transaction_hash: B256,
	/// The block number where the transaction was included.
	#[serde(default, with = "alloy::serde::quantity::opt")]
	pub block_number: Option<u64>,
	/// Hash of the including block. Pending receipts leave this empty.
	#[serde(default)]
	pub block_hash: Option<B256>,
	/// Execution status: `1` for success, `0` for failure. Nodes predating
	/// Byzantium omit it.
	#[serde(default, with = "alloy::serde::quantity::opt")]
	pub status: Option<u64>,
	/// Gas consumed by this transaction alone.
	#[serde(default, with = "alloy::serde::quantity::opt")]
	pub gas_used: Option<u64>,
	/// Sender.
	#[serde(default)]
	pub from: Option<Address>,
	/// Recipient, empty for contract creation.
	#[serde(default)]
	pub to: Option<Address>,
	/// Address of the created contract, if any.
	#[serde(default)]
	pub contract_address: Option<Address>,
	/// Event logs emitted during execution.
	#[serde(default)]
	pub logs: Vec<Log>,
}

impl TransactionReceipt {
	/// Whether the receipt belongs to a mined block.
	pub fn is_mined(&self) -> bool {
		self.block_hash.is_some()
	}

	/// Whether the node reported successful execution.
	///
	/// A missing status counts as success.
	pub fn succeeded(&self) -> bool {
		self.status.is_none_or(|status| status == 1)
	}
}
