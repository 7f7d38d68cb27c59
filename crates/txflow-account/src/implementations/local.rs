//! Local transaction signer for managed wallet accounts.
//!
//! Produces EIP-155 protected legacy transactions with alloy. The request must
//! already be complete: chain id, nonce, gas limit and gas price are all part
//! of the signed payload.

use crate::wallet::parse_signer;
use crate::{SigningError, TransactionSigner};
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{keccak256, TxKind};
use async_trait::async_trait;
use txflow_types::{PrivateKey, SignedTransaction, TransactionRequest};

/// Signs with the private key handed in by the submission operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransactionSigner;

impl LocalTransactionSigner {
	/// Synchronous signing; the async trait method delegates here.
	pub fn sign_with_key(
		&self,
		request: &TransactionRequest,
		private_key: &PrivateKey,
	) -> Result<SignedTransaction, SigningError> {
		let signer = parse_signer(private_key)?;

		if let Some(from) = request.from {
			if from != signer.address() {
				return Err(SigningError::Failed(format!(
					"key controls {} but request is from {}",
					signer.address(),
					from
				)));
			}
		}

		let mut tx = TxLegacy {
			chain_id: Some(request.chain_id.ok_or(SigningError::MissingField("chainId"))?),
			nonce: request.nonce.ok_or(SigningError::MissingField("nonce"))?,
			gas_price: request
				.gas_price
				.ok_or(SigningError::MissingField("gasPrice"))?,
			gas_limit: request.gas.ok_or(SigningError::MissingField("gas"))?,
			to: request.to.map(TxKind::Call).unwrap_or(TxKind::Create),
			value: request.value.unwrap_or_default(),
			input: request.data.clone().unwrap_or_default(),
		};

		let signature = signer
			.sign_transaction_sync(&mut tx)
			.map_err(|e| SigningError::Failed(e.to_string()))?;
		let envelope = TxEnvelope::from(tx.into_signed(signature));
		let raw = envelope.encoded_2718();

		Ok(SignedTransaction {
			transaction_hash: keccak256(&raw),
			raw_transaction: raw.into(),
			request: request.clone(),
		})
	}
}

#[async_trait]
impl TransactionSigner for LocalTransactionSigner {
	async fn sign(
		&self,
		request: &TransactionRequest,
		private_key: Option<&PrivateKey>,
	) -> Result<SignedTransaction, SigningError> {
		let key = private_key.ok_or(SigningError::MissingKey)?;
		let signed = self.sign_with_key(request, key)?;
		tracing::debug!(tx_hash = %signed.transaction_hash, "Signed transaction locally");
		Ok(signed)
	}
}
