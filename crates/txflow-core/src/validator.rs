//! Receipt classification.

use crate::MethodError;
use txflow_types::TransactionReceipt;

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionReceiptValidator;

impl TransactionReceiptValidator {
	/// Accepts a successful receipt. Receipts without a status field are
	/// treated as successful.
	///
	/// A failed receipt that used exactly `gas_provided` is reported as
	/// [`MethodError::OutOfGas`], any other failure as
	/// [`MethodError::Reverted`].
	pub fn validate(
		&self,
		receipt: &TransactionReceipt,
		gas_provided: Option<u64>,
	) -> Result<(), MethodError> {
		if receipt.succeeded() {
			return Ok(());
		}

		let out_of_gas = matches!(
			(gas_provided, receipt.gas_used),
			(Some(provided), Some(used)) if provided == used
		);
		if out_of_gas {
			Err(MethodError::OutOfGas(Box::new(receipt.clone())))
		} else {
			Err(MethodError::Reverted(Box::new(receipt.clone())))
		}
	}
}
