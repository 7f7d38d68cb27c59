//! Block header types.

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};

/// The subset of a block header the confirmation workflow cares about.
///
/// Both `newHeads` notifications and `eth_getBlockByNumber` responses
/// deserialize into this shape; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
	/// Block height.
	#[serde(with = "alloy::serde::quantity")]
	pub number: u64,
	/// Block hash.
	pub hash: B256,
	/// Parent block hash.
	#[serde(default)]
	pub parent_hash: B256,
	/// Unix timestamp in seconds.
	#[serde(default, with = "alloy::serde::quantity")]
	pub timestamp: u64,
}
