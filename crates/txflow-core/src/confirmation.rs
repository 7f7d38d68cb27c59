//! Header-driven confirmation tracking.
//!
//! Each new header either triggers a receipt lookup (while the transaction
//! is not yet mined) or adds one confirmation (once it is). The run ends as
//! `Confirmed`, `Failed`, `TimedOut` or `Cancelled`, and the header
//! subscription is released before the outcome reaches the caller.
//!
//! Confirmations are counted per header without re-fetching the receipt, so
//! a reorg that drops the including block goes unnoticed.

use crate::handle::{cancelled, Emitter};
use crate::module::ModuleContext;
use crate::receipt::ReceiptFetcher;
use crate::validator::TransactionReceiptValidator;
use crate::watcher::NewHeadsWatcher;
use crate::MethodError;
use tracing::instrument;
use txflow_transport::RpcError;
use txflow_types::{truncate_id, TransactionReceipt, B256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
	Watching,
	Confirmed,
	TimedOut,
	Failed,
	Cancelled,
}

impl ConfirmationStatus {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, ConfirmationStatus::Watching)
	}
}

/// Progress of one workflow run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationState {
	receipt: Option<TransactionReceipt>,
	confirmations: u64,
	target: u64,
	blocks_waited: u64,
	block_timeout: u64,
	status: ConfirmationStatus,
}

impl ConfirmationState {
	pub fn new(target: u64, block_timeout: u64) -> Self {
		Self {
			receipt: None,
			confirmations: 0,
			target,
			blocks_waited: 0,
			block_timeout,
			status: ConfirmationStatus::Watching,
		}
	}

	pub fn receipt(&self) -> Option<&TransactionReceipt> {
		self.receipt.as_ref()
	}

	pub fn confirmations(&self) -> u64 {
		self.confirmations
	}

	pub fn blocks_waited(&self) -> u64 {
		self.blocks_waited
	}

	pub fn status(&self) -> ConfirmationStatus {
		self.status
	}

	/// A header arrived and the transaction is still not mined.
	pub fn record_missing_receipt(&mut self) -> ConfirmationStatus {
		self.blocks_waited += 1;
		if self.blocks_waited >= self.block_timeout {
			self.status = ConfirmationStatus::TimedOut;
		}
		self.status
	}

	/// A valid receipt was found. A zero target confirms immediately.
	pub fn record_receipt(&mut self, receipt: TransactionReceipt) -> ConfirmationStatus {
		self.receipt = Some(receipt);
		if self.target == 0 {
			self.status = ConfirmationStatus::Confirmed;
		}
		self.status
	}

	/// A header arrived on top of the including block.
	pub fn record_confirmation(&mut self) -> ConfirmationStatus {
		self.confirmations += 1;
		if self.confirmations >= self.target {
			self.status = ConfirmationStatus::Confirmed;
		}
		self.status
	}

	fn finish(&mut self, status: ConfirmationStatus) {
		self.status = status;
	}
}

/// Watches heads, fetches and validates the receipt, and counts
/// confirmations for one transaction at a time per call.
#[derive(Debug)]
pub struct TransactionConfirmationWorkflow {
	validator: TransactionReceiptValidator,
	watcher: NewHeadsWatcher,
	receipt_fetcher: ReceiptFetcher,
}

impl TransactionConfirmationWorkflow {
	pub fn new(
		validator: TransactionReceiptValidator,
		watcher: NewHeadsWatcher,
		receipt_fetcher: ReceiptFetcher,
	) -> Self {
		Self {
			validator,
			watcher,
			receipt_fetcher,
		}
	}

	/// Tracks `hash` and delivers the outcome through `emitter`.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(&hash.to_string())))]
	pub(crate) async fn execute(
		&self,
		module: &ModuleContext,
		hash: B256,
		gas_provided: Option<u64>,
		emitter: Emitter,
	) -> ConfirmationState {
		let options = module.options();
		let mut state = ConfirmationState::new(options.confirmation_blocks, options.block_timeout);

		let mut heads = match self.watcher.watch(module).await {
			Ok(heads) => heads,
			Err(e) => {
				tracing::warn!(error = %e, "Could not watch new heads");
				state.finish(ConfirmationStatus::Failed);
				emitter.reject(e);
				return state;
			}
		};
		let mut cancel = emitter.cancel_signal();

		loop {
			let header = tokio::select! {
				biased;
				_ = cancelled(&mut cancel) => {
					tracing::info!("Transaction tracking cancelled");
					heads.unsubscribe().await;
					state.finish(ConfirmationStatus::Cancelled);
					emitter.reject(MethodError::Cancelled);
					return state;
				}
				header = heads.next() => header,
			};

			let Some(header) = header else {
				heads.unsubscribe().await;
				state.finish(ConfirmationStatus::Failed);
				emitter.reject(MethodError::Rpc(RpcError::transport(
					"Block header subscription closed",
				)));
				return state;
			};
			tracing::debug!(block = header.number, "New head");

			if let Some(receipt) = state.receipt().cloned() {
				let status = state.record_confirmation();
				tracing::debug!(confirmations = state.confirmations(), "Confirmation");
				emitter.confirmation(state.confirmations(), receipt.clone());
				if status == ConfirmationStatus::Confirmed {
					tracing::info!(confirmations = state.confirmations(), "Transaction confirmed");
					heads.unsubscribe().await;
					emitter.resolve(receipt);
					return state;
				}
				continue;
			}

			match self.receipt_fetcher.fetch(module, hash).await {
				Err(e) => {
					tracing::warn!(error = %e, "Receipt lookup failed");
					heads.unsubscribe().await;
					state.finish(ConfirmationStatus::Failed);
					emitter.reject(e);
					return state;
				}
				Ok(None) => {
					if state.record_missing_receipt() == ConfirmationStatus::TimedOut {
						tracing::warn!(blocks = state.blocks_waited(), "Transaction not mined in time");
						heads.unsubscribe().await;
						emitter.reject(MethodError::Timeout {
							blocks: options.block_timeout,
						});
						return state;
					}
				}
				Ok(Some(receipt)) => {
					if let Err(e) = self.validator.validate(&receipt, gas_provided) {
						tracing::warn!(error = %e, "Transaction failed");
						heads.unsubscribe().await;
						state.finish(ConfirmationStatus::Failed);
						emitter.reject(e);
						return state;
					}
					tracing::info!(block = ?receipt.block_number, "Transaction mined");
					if state.record_receipt(receipt.clone()) == ConfirmationStatus::Confirmed {
						heads.unsubscribe().await;
						emitter.resolve(receipt);
						return state;
					}
				}
			}
		}
	}
}
