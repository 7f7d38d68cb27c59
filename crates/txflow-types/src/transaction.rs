//! Transaction request types for the txflow pipeline.
//!
//! A [`TransactionRequest`] is what the caller hands to `sendTransaction`. It
//! is completed in place by the submission operation and, once the node has
//! accepted it, archived unchanged next to the resulting hash as a
//! [`SubmittedTransaction`].

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Transaction parameters as accepted by `eth_sendTransaction`.
///
/// Every field except `from` may be left empty by the caller; gas, gas price,
/// chain id and nonce are filled by the submission operation before dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
	/// Sending account.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<Address>,
	/// Recipient; `None` deploys a contract.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to: Option<Address>,
	/// Value transferred in wei.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
	/// Call data or contract init code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Bytes>,
	/// Gas limit.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "alloy::serde::quantity::opt"
	)]
	pub gas: Option<u64>,
	/// Gas price in wei.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "alloy::serde::quantity::opt"
	)]
	pub gas_price: Option<u128>,
	/// Account nonce. `Some(0)` is an explicit value, not an absent one.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "alloy::serde::quantity::opt"
	)]
	pub nonce: Option<u64>,
	/// Network identifier mixed into the signature.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "alloy::serde::quantity::opt"
	)]
	pub chain_id: Option<u64>,
}

impl TransactionRequest {
	/// Creates an empty request sent from `from`.
	pub fn new(from: Address) -> Self {
		Self {
			from: Some(from),
			..Default::default()
		}
	}

	/// Sets the recipient.
	pub fn to(mut self, to: Address) -> Self {
		self.to = Some(to);
		self
	}

	/// Sets the transferred value.
	pub fn value(mut self, value: U256) -> Self {
		self.value = Some(value);
		self
	}

	/// Sets the call data.
	pub fn data(mut self, data: impl Into<Bytes>) -> Self {
		self.data = Some(data.into());
		self
	}

	/// Sets the gas limit.
	pub fn gas(mut self, gas: u64) -> Self {
		self.gas = Some(gas);
		self
	}

	/// Sets the gas price.
	pub fn gas_price(mut self, gas_price: u128) -> Self {
		self.gas_price = Some(gas_price);
		self
	}

	/// Sets the nonce.
	pub fn nonce(mut self, nonce: u64) -> Self {
		self.nonce = Some(nonce);
		self
	}

	/// Sets the chain id.
	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = Some(chain_id);
		self
	}
}

/// Output of a transaction signer.
///
/// Carries the network-ready encoded payload, its hash, and the exact request
/// that was signed. Produced once and consumed once by the raw-send path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
	/// RLP encoded signed transaction.
	pub raw_transaction: Bytes,
	/// Hash of the signed transaction.
	pub transaction_hash: B256,
	/// The request the signature covers.
	pub request: TransactionRequest,
}

/// A transaction the node has accepted.
///
/// The request is only known when the submission went through
/// `sendTransaction`; raw sends of caller-signed payloads archive the hash
/// alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTransaction {
	/// Hash returned by the node.
	pub hash: B256,
	/// Completed request as it was sent or signed.
	pub request: Option<TransactionRequest>,
}
