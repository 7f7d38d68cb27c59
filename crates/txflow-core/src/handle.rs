//! Caller-facing handle of a submitted transaction.
//!
//! A [`PendingTransaction`] delivers the same outcome over two channels: it
//! is a future resolving once to the final receipt or error, and it hands
//! out an ordered event stream of `TransactionHash`, zero or more
//! `Confirmation`s, and exactly one terminal `Receipt` or `Error`. Both are
//! fed by a single [`Emitter`] owned by the submission task.

use crate::MethodError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{ready, Context, Poll};
use tokio::sync::{broadcast, oneshot, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use txflow_config::MAX_CONFIRMATION_BLOCKS;
use txflow_types::{SubmittedTransaction, TransactionReceipt, B256};

type Outcome = Result<TransactionReceipt, MethodError>;

const MIN_EVENT_CAPACITY: usize = 16;
// hash + confirmations + terminal
const EVENTS_BEYOND_CONFIRMATIONS: u64 = 3;

/// Progress notifications for one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionEvent {
	/// The node accepted the transaction.
	TransactionHash(B256),
	/// One more block was built on top of the including block.
	Confirmation {
		count: u64,
		receipt: TransactionReceipt,
	},
	/// Terminal: the transaction reached the confirmation target.
	Receipt(TransactionReceipt),
	/// Terminal: the submission or the tracking failed.
	Error(MethodError),
}

impl TransactionEvent {
	pub fn is_terminal(&self) -> bool {
		matches!(self, TransactionEvent::Receipt(_) | TransactionEvent::Error(_))
	}
}

/// Creates a connected emitter/handle pair sized for `confirmation_blocks`.
///
/// The buffer holds every event of the run, so the first subscriber never
/// lags. Targets above [`MAX_CONFIRMATION_BLOCKS`] are rejected.
pub(crate) fn channel(
	confirmation_blocks: u64,
) -> Result<(Emitter, PendingTransaction), MethodError> {
	if confirmation_blocks > MAX_CONFIRMATION_BLOCKS {
		return Err(MethodError::InvalidParameters(format!(
			"confirmation target {} exceeds the maximum of {} blocks",
			confirmation_blocks, MAX_CONFIRMATION_BLOCKS
		)));
	}
	let capacity = usize::try_from(confirmation_blocks + EVENTS_BEYOND_CONFIRMATIONS)
		.unwrap_or(usize::MAX)
		.max(MIN_EVENT_CAPACITY);

	let (outcome_tx, outcome_rx) = oneshot::channel();
	let (events_tx, events_rx) = broadcast::channel(capacity);
	let (cancel_tx, cancel_rx) = watch::channel(false);
	let submitted = Arc::new(OnceLock::new());

	let emitter = Emitter {
		outcome: outcome_tx,
		events: events_tx.clone(),
		cancel: cancel_rx,
		submitted: Arc::clone(&submitted),
	};
	let pending = PendingTransaction {
		outcome: outcome_rx,
		events: events_tx,
		initial: Some(events_rx),
		cancel: CancelHandle(Arc::new(cancel_tx)),
		submitted,
	};
	Ok((emitter, pending))
}

/// Handle returned by `sendTransaction` and the other sending methods.
///
/// Awaiting it yields the final receipt. Event subscriptions taken before
/// awaiting keep working after the handle is consumed.
pub struct PendingTransaction {
	outcome: oneshot::Receiver<Outcome>,
	events: broadcast::Sender<TransactionEvent>,
	initial: Option<broadcast::Receiver<TransactionEvent>>,
	cancel: CancelHandle,
	submitted: Arc<OnceLock<SubmittedTransaction>>,
}

impl PendingTransaction {
	/// Subscribes to events.
	///
	/// The first subscription sees every event from the transaction hash on;
	/// later ones only see events emitted after they subscribed.
	pub fn subscribe(&mut self) -> broadcast::Receiver<TransactionEvent> {
		self.initial
			.take()
			.unwrap_or_else(|| self.events.subscribe())
	}

	/// Event stream that ends after the terminal event.
	pub fn events(&mut self) -> TransactionEvents {
		TransactionEvents {
			inner: BroadcastStream::new(self.subscribe()),
			finished: false,
		}
	}

	/// Stops the submission. Before the transaction is broadcast it is never
	/// sent; afterwards the workflow releases its header subscription. Either way the handle resolves to
	/// [`MethodError::Cancelled`]. Has no effect once a terminal outcome was
	/// delivered.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// A cloneable canceller usable while the handle is being awaited.
	pub fn cancel_handle(&self) -> CancelHandle {
		self.cancel.clone()
	}

	/// The archived request and hash, once the node accepted the transaction.
	pub fn submitted(&self) -> Option<SubmittedTransaction> {
		self.submitted.get().cloned()
	}
}

impl Future for PendingTransaction {
	type Output = Outcome;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.outcome)
			.poll(cx)
			.map(|result| result.unwrap_or(Err(MethodError::Dropped)))
	}
}

#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
	pub fn cancel(&self) {
		self.0.send_replace(true);
	}
}

/// Stream of [`TransactionEvent`]s ending after `Receipt` or `Error`.
pub struct TransactionEvents {
	inner: BroadcastStream<TransactionEvent>,
	finished: bool,
}

impl Stream for TransactionEvents {
	type Item = TransactionEvent;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		if self.finished {
			return Poll::Ready(None);
		}
		loop {
			match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
				Some(Ok(event)) => {
					self.finished = event.is_terminal();
					return Poll::Ready(Some(event));
				}
				Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
					tracing::warn!(skipped, "Transaction event subscriber lagged");
				}
				None => return Poll::Ready(None),
			}
		}
	}
}

/// Producer side of a [`PendingTransaction`].
///
/// Terminal deliveries consume the emitter, so an outcome is produced at
/// most once.
pub(crate) struct Emitter {
	outcome: oneshot::Sender<Outcome>,
	events: broadcast::Sender<TransactionEvent>,
	cancel: watch::Receiver<bool>,
	submitted: Arc<OnceLock<SubmittedTransaction>>,
}

impl Emitter {
	pub(crate) fn archive(&self, submitted: SubmittedTransaction) {
		let _ = self.submitted.set(submitted);
	}

	pub(crate) fn transaction_hash(&self, hash: B256) {
		self.emit(TransactionEvent::TransactionHash(hash));
	}

	pub(crate) fn confirmation(&self, count: u64, receipt: TransactionReceipt) {
		self.emit(TransactionEvent::Confirmation { count, receipt });
	}

	pub(crate) fn resolve(self, receipt: TransactionReceipt) {
		self.emit(TransactionEvent::Receipt(receipt.clone()));
		let _ = self.outcome.send(Ok(receipt));
	}

	pub(crate) fn reject(self, error: MethodError) {
		self.emit(TransactionEvent::Error(error.clone()));
		let _ = self.outcome.send(Err(error));
	}

	pub(crate) fn is_cancelled(&self) -> bool {
		*self.cancel.borrow()
	}

	/// Receiver that flips to `true` when the caller cancels.
	pub(crate) fn cancel_signal(&self) -> watch::Receiver<bool> {
		self.cancel.clone()
	}

	fn emit(&self, event: TransactionEvent) {
		// no receivers is fine; the handle may only be awaited
		let _ = self.events.send(event);
	}
}

/// Completes when `signal` turns `true`. Pends forever once every canceller
/// is gone.
pub(crate) async fn cancelled(signal: &mut watch::Receiver<bool>) {
	if signal.wait_for(|cancelled| *cancelled).await.is_err() {
		std::future::pending::<()>().await;
	}
}
