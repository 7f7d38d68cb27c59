//! Core transaction pipeline for txflow.
//!
//! This module wires RPC methods together from their static descriptors,
//! completes and signs outgoing transactions, and tracks submitted
//! transactions through a header-driven confirmation workflow. Results reach
//! the caller through a [`PendingTransaction`] handle that is both a future
//! and an ordered event stream.

use thiserror::Error;
use txflow_account::SigningError;
use txflow_transport::RpcError;
use txflow_types::{QuantityError, TransactionReceipt};

pub mod confirmation;
pub mod factory;
pub mod handle;
pub mod methods;
pub mod module;
pub mod receipt;
pub mod validator;
pub mod watcher;

pub use confirmation::{ConfirmationState, ConfirmationStatus, TransactionConfirmationWorkflow};
pub use factory::{MethodFactory, ModuleFactory};
pub use handle::{CancelHandle, PendingTransaction, TransactionEvent, TransactionEvents};
pub use methods::{CallMethod, Method, MethodOutput, SendMethod, SendTransactionMethod};
pub use module::{ModuleContext, ModuleOptions};
pub use receipt::ReceiptFetcher;
pub use validator::TransactionReceiptValidator;
pub use watcher::{HeadSubscription, NewHeadsWatcher};

/// Errors that can occur while creating or executing a method.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MethodError {
	/// No registry entry exists under this name.
	#[error("Method not found: {0}")]
	UnknownMethod(String),
	/// The positional parameter count does not match the descriptor.
	#[error("Invalid number of parameters for \"{method}\". Got {given} expected {expected}!")]
	InvalidArguments {
		method: &'static str,
		expected: usize,
		given: usize,
	},
	/// A field required before dispatch could not be filled.
	#[error("The \"{0}\" field must be defined")]
	MissingField(&'static str),
	/// The parameters could not be interpreted.
	#[error("Invalid parameters: {0}")]
	InvalidParameters(String),
	/// The node or the transport reported an error.
	#[error(transparent)]
	Rpc(#[from] RpcError),
	/// The signer rejected the request.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// The transaction was mined but failed.
	#[error("Transaction has been reverted by the EVM: {}", .0.transaction_hash)]
	Reverted(Box<TransactionReceipt>),
	/// The transaction was mined but consumed all supplied gas.
	#[error("Transaction ran out of gas. Please provide more gas: {}", .0.transaction_hash)]
	OutOfGas(Box<TransactionReceipt>),
	/// No receipt appeared within the block timeout.
	#[error("Transaction was not mined within {blocks} blocks, please make sure your transaction was properly sent. Be aware that it might still be mined!")]
	Timeout { blocks: u64 },
	/// A node response did not have the expected shape.
	#[error("Invalid response: {0}")]
	Decode(String),
	/// The caller cancelled the handle.
	#[error("Transaction tracking was cancelled")]
	Cancelled,
	/// The submission task ended without delivering an outcome.
	#[error("Transaction task ended without a result")]
	Dropped,
}

impl From<QuantityError> for MethodError {
	fn from(err: QuantityError) -> Self {
		MethodError::Decode(err.to_string())
	}
}

impl MethodError {
	/// The receipt attached to a mined-but-failed transaction.
	pub fn receipt(&self) -> Option<&TransactionReceipt> {
		match self {
			MethodError::Reverted(receipt) | MethodError::OutOfGas(receipt) => Some(receipt),
			_ => None,
		}
	}
}
