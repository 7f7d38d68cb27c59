//! Common types module for the txflow transaction pipeline.
//!
//! This module defines the data types shared by every txflow crate: the
//! transaction request that callers fill in, the receipt and block header
//! shapes returned by the node, and the static method descriptors used by the
//! method factory.

/// Block header types delivered by the head watcher.
pub mod block;
/// Static RPC method descriptors.
pub mod method;
/// Transaction receipt and log types.
pub mod receipt;
/// Redacted private key wrapper.
pub mod secret;
/// Transaction request and signed payload types.
pub mod transaction;
/// Utility functions for hex quantities and display formatting.
pub mod utils;

// Re-export all types for convenient access
pub use alloy::primitives::{Address, Bytes, B256, U256};
pub use block::BlockHeader;
pub use method::{MethodDescriptor, MethodKind};
pub use receipt::{Log, TransactionReceipt};
pub use secret::PrivateKey;
pub use transaction::{SignedTransaction, SubmittedTransaction, TransactionRequest};
pub use utils::{
	parse_quantity, parse_quantity_u128, truncate_id, without_0x_prefix,
	QuantityError,
};
