//! Methods that submit a transaction and track it to confirmation.

use super::call::validate_arguments;
use crate::confirmation::TransactionConfirmationWorkflow;
use crate::handle::{self, Emitter, PendingTransaction};
use crate::module::ModuleContext;
use crate::MethodError;
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;
use txflow_types::{MethodDescriptor, SubmittedTransaction, TransactionRequest, B256};

#[derive(Clone)]
pub struct SendMethod {
	descriptor: MethodDescriptor,
	parameters: Vec<Value>,
	workflow: Arc<TransactionConfirmationWorkflow>,
}

impl SendMethod {
	pub fn new(descriptor: MethodDescriptor, workflow: Arc<TransactionConfirmationWorkflow>) -> Self {
		Self {
			descriptor,
			parameters: Vec::new(),
			workflow,
		}
	}

	pub fn descriptor(&self) -> &MethodDescriptor {
		&self.descriptor
	}

	pub fn set_parameters(&mut self, parameters: Vec<Value>) {
		self.parameters = parameters;
	}

	pub fn parameters(&self) -> &[Value] {
		&self.parameters
	}

	pub fn workflow(&self) -> &Arc<TransactionConfirmationWorkflow> {
		&self.workflow
	}

	pub fn validate_arguments(&self, given: usize) -> Result<(), MethodError> {
		validate_arguments(&self.descriptor, given)
	}

	/// Submits the stored parameters and returns the tracking handle.
	///
	/// Must be called within a Tokio runtime; submission and tracking run on
	/// a spawned task.
	pub fn execute(&self, module: &Arc<ModuleContext>) -> Result<PendingTransaction, MethodError> {
		self.validate_arguments(self.parameters.len())?;

		let (emitter, pending) = handle::channel(module.options().confirmation_blocks)?;
		let method = self.clone();
		let module = Arc::clone(module);
		let span = tracing::info_span!("send", method = self.descriptor.rpc_method);

		tokio::spawn(
			async move {
				let parameters = method.parameters.clone();
				method
					.dispatch(&module, parameters, None, None, emitter)
					.await;
			}
			.instrument(span),
		);

		Ok(pending)
	}

	/// Sends `parameters`, reports the hash and runs the confirmation
	/// workflow. Every outcome, including a failed send, goes to `emitter`.
	pub(crate) async fn dispatch(
		&self,
		module: &Arc<ModuleContext>,
		parameters: Vec<Value>,
		gas_provided: Option<u64>,
		request: Option<TransactionRequest>,
		emitter: Emitter,
	) {
		if emitter.is_cancelled() {
			tracing::debug!(method = self.descriptor.rpc_method, "Cancelled before submission");
			emitter.reject(MethodError::Cancelled);
			return;
		}
		let hash = match self.send(module, parameters).await {
			Ok(hash) => hash,
			Err(e) => {
				tracing::warn!(method = self.descriptor.rpc_method, error = %e, "Transaction submission failed");
				emitter.reject(e);
				return;
			}
		};

		tracing::info!(tx_hash = %hash, "Transaction submitted");
		emitter.archive(SubmittedTransaction { hash, request });
		emitter.transaction_hash(hash);

		self.workflow
			.execute(module, hash, gas_provided, emitter)
			.await;
	}

	async fn send(&self, module: &ModuleContext, parameters: Vec<Value>) -> Result<B256, MethodError> {
		self.validate_arguments(parameters.len())?;
		let value = module
			.transport()
			.call(self.descriptor.rpc_method, parameters)
			.await?;
		serde_json::from_value(value)
			.map_err(|e| MethodError::Decode(format!("transaction hash: {}", e)))
	}
}
