//! `sendTransaction`: field completion, signer selection and dispatch.
//!
//! The request is completed in two stages. Fields that decide whether the
//! call can proceed at all (`from`, and `gas` for client-side signing) are
//! resolved synchronously so the caller gets an immediate error. Everything
//! that needs the node (gas price, chain id, nonce) is resolved on the
//! submission task, and failures there are delivered through the handle.
//!
//! Nonces are read with `eth_getTransactionCount(from, "pending")` and are
//! not reserved: concurrent submissions from one account may pick the same
//! nonce.

use super::call::CallMethod;
use super::send::SendMethod;
use crate::confirmation::TransactionConfirmationWorkflow;
use crate::handle::{self, Emitter, PendingTransaction};
use crate::module::ModuleContext;
use crate::MethodError;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Instrument;
use txflow_account::{
	select_signing_path, LocalTransactionSigner, SigningPath, TransactionSigner,
};
use txflow_types::{
	parse_quantity, MethodDescriptor, PrivateKey, SignedTransaction, TransactionRequest,
};

#[derive(Clone)]
pub struct SendTransactionMethod {
	send: SendMethod,
	send_raw_transaction: SendMethod,
	chain_id: CallMethod,
	transaction_count: CallMethod,
}

impl SendTransactionMethod {
	/// `send_raw_transaction` must carry the same workflow instance.
	pub fn new(
		descriptor: MethodDescriptor,
		workflow: Arc<TransactionConfirmationWorkflow>,
		send_raw_transaction: SendMethod,
		chain_id: CallMethod,
		transaction_count: CallMethod,
	) -> Self {
		Self {
			send: SendMethod::new(descriptor, workflow),
			send_raw_transaction,
			chain_id,
			transaction_count,
		}
	}

	pub fn descriptor(&self) -> &MethodDescriptor {
		self.send.descriptor()
	}

	pub fn set_parameters(&mut self, parameters: Vec<Value>) {
		self.send.set_parameters(parameters);
	}

	pub fn workflow(&self) -> &Arc<TransactionConfirmationWorkflow> {
		self.send.workflow()
	}

	pub fn send_raw_transaction_method(&self) -> &SendMethod {
		&self.send_raw_transaction
	}

	pub fn chain_id_method(&self) -> &CallMethod {
		&self.chain_id
	}

	pub fn transaction_count_method(&self) -> &CallMethod {
		&self.transaction_count
	}

	/// Completes, signs if needed, and submits the stored request.
	///
	/// Must be called within a Tokio runtime.
	pub fn execute(&self, module: &Arc<ModuleContext>) -> Result<PendingTransaction, MethodError> {
		let parameters = self.send.parameters();
		self.send.validate_arguments(parameters.len())?;

		let mut request: TransactionRequest = serde_json::from_value(parameters[0].clone())
			.map_err(|e| MethodError::InvalidParameters(e.to_string()))?;

		let options = module.options();
		if request.from.is_none() {
			request.from = options.default_account;
		}
		let from = request.from.ok_or(MethodError::MissingField("from"))?;
		if request.gas.is_none() {
			request.gas = options.default_gas;
		}

		let path = select_signing_path(&from, module.wallet(), module.signer());
		if path.signs_locally() && request.gas.is_none() {
			return Err(MethodError::MissingField("gas"));
		}

		let (emitter, pending) = handle::channel(options.confirmation_blocks)?;
		let method = self.clone();
		let module = Arc::clone(module);
		let span = tracing::info_span!("send_transaction", from = %from, path = ?path);

		tokio::spawn(
			async move {
				method.submit(&module, request, path, emitter).await;
			}
			.instrument(span),
		);

		Ok(pending)
	}

	async fn submit(
		&self,
		module: &Arc<ModuleContext>,
		mut request: TransactionRequest,
		path: SigningPath,
		emitter: Emitter,
	) {
		if let Err(e) = complete_gas_price(module, &mut request).await {
			emitter.reject(e);
			return;
		}
		if emitter.is_cancelled() {
			emitter.reject(MethodError::Cancelled);
			return;
		}

		match path {
			SigningPath::NodeManaged => {
				let parameters = match serde_json::to_value(&request) {
					Ok(value) => vec![value],
					Err(e) => {
						emitter.reject(MethodError::InvalidParameters(e.to_string()));
						return;
					}
				};
				let gas = request.gas;
				self.send
					.dispatch(module, parameters, gas, Some(request), emitter)
					.await;
			}
			SigningPath::ManagedWallet(key) => {
				self.sign_and_send(module, request, &LocalTransactionSigner, Some(key), emitter)
					.await;
			}
			SigningPath::ExternalSigner(signer) => {
				self.sign_and_send(module, request, signer.as_ref(), None, emitter)
					.await;
			}
		}
	}

	async fn sign_and_send(
		&self,
		module: &Arc<ModuleContext>,
		request: TransactionRequest,
		signer: &dyn TransactionSigner,
		private_key: Option<PrivateKey>,
		emitter: Emitter,
	) {
		let signed = match self
			.sign(module, request, signer, private_key.as_ref())
			.await
		{
			Ok(signed) => signed,
			Err(e) => {
				tracing::warn!(error = %e, "Could not sign transaction");
				emitter.reject(e);
				return;
			}
		};

		let SignedTransaction {
			raw_transaction,
			request,
			..
		} = signed;
		let gas = request.gas;
		self.send_raw_transaction
			.dispatch(
				module,
				vec![json!(raw_transaction)],
				gas,
				Some(request),
				emitter,
			)
			.await;
	}

	/// Fills chain id and nonce, then signs exactly once.
	async fn sign(
		&self,
		module: &ModuleContext,
		mut request: TransactionRequest,
		signer: &dyn TransactionSigner,
		private_key: Option<&PrivateKey>,
	) -> Result<SignedTransaction, MethodError> {
		if request.chain_id.is_none() {
			let value = self.chain_id.call(module, Vec::new()).await?;
			request.chain_id = Some(parse_quantity(&value)?);
		}

		if request.nonce.is_none() {
			let from = request.from.ok_or(MethodError::MissingField("from"))?;
			let value = self
				.transaction_count
				.call(module, vec![json!(from), json!("pending")])
				.await?;
			request.nonce = Some(parse_quantity(&value)?);
		}

		Ok(signer.sign(&request, private_key).await?)
	}
}

/// Uses the caller's gas price, then the module default, then the node's
/// estimate.
async fn complete_gas_price(
	module: &ModuleContext,
	request: &mut TransactionRequest,
) -> Result<(), MethodError> {
	if request.gas_price.is_some() {
		return Ok(());
	}
	request.gas_price = match module.options().default_gas_price {
		Some(price) => Some(price),
		None => Some(module.gas_price().await?),
	};
	Ok(())
}
