//! Receipt lookup for the confirmation workflow.

use crate::methods::CallMethod;
use crate::module::ModuleContext;
use crate::MethodError;
use serde_json::{json, Value};
use txflow_types::{TransactionReceipt, B256};

#[derive(Debug, Clone)]
pub struct ReceiptFetcher {
	method: CallMethod,
}

impl ReceiptFetcher {
	/// `method` must describe `eth_getTransactionReceipt`.
	pub fn new(method: CallMethod) -> Self {
		Self { method }
	}

	/// Returns `None` while the transaction is not in a block.
	pub async fn fetch(
		&self,
		module: &ModuleContext,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, MethodError> {
		let value = self.method.call(module, vec![json!(hash)]).await?;
		decode_receipt(value)
	}
}

fn decode_receipt(value: Value) -> Result<Option<TransactionReceipt>, MethodError> {
	if value.is_null() {
		return Ok(None);
	}
	let receipt: TransactionReceipt = serde_json::from_value(value)
		.map_err(|e| MethodError::Decode(format!("transaction receipt: {}", e)))?;
	// some nodes return pending receipts without a block hash
	Ok(receipt.is_mined().then_some(receipt))
}
