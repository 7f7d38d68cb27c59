//! Method construction.
//!
//! [`MethodFactory`] looks a name up in the static registry and wires the
//! dependencies its kind calls for. [`ModuleFactory`] builds the shared
//! pieces, currently the confirmation workflow.

use crate::confirmation::TransactionConfirmationWorkflow;
use crate::methods::{registry, CallMethod, Method, SendMethod, SendTransactionMethod};
use crate::receipt::ReceiptFetcher;
use crate::validator::TransactionReceiptValidator;
use crate::watcher::NewHeadsWatcher;
use crate::MethodError;
use std::sync::Arc;
use txflow_types::MethodKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleFactory;

impl ModuleFactory {
	/// Builds a fresh workflow with its own receipt fetcher.
	pub fn create_transaction_confirmation_workflow(&self) -> Arc<TransactionConfirmationWorkflow> {
		Arc::new(TransactionConfirmationWorkflow::new(
			TransactionReceiptValidator,
			NewHeadsWatcher,
			ReceiptFetcher::new(CallMethod::new(registry::GET_TRANSACTION_RECEIPT)),
		))
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MethodFactory {
	module_factory: ModuleFactory,
}

impl MethodFactory {
	pub fn new(module_factory: ModuleFactory) -> Self {
		Self { module_factory }
	}

	pub fn has_method(&self, name: &str) -> bool {
		registry::lookup(name).is_some()
	}

	/// Public method names in registry order.
	pub fn method_names(&self) -> impl Iterator<Item = &'static str> {
		registry::METHODS.iter().map(|(name, _)| *name)
	}

	pub fn create_method(&self, name: &str) -> Result<Method, MethodError> {
		let descriptor =
			registry::lookup(name).ok_or_else(|| MethodError::UnknownMethod(name.to_string()))?;

		let method = match descriptor.kind {
			MethodKind::Call => Method::Call(CallMethod::new(descriptor)),
			MethodKind::Send => Method::Send(SendMethod::new(
				descriptor,
				self.module_factory.create_transaction_confirmation_workflow(),
			)),
			MethodKind::SendTransaction => {
				let workflow = self.module_factory.create_transaction_confirmation_workflow();
				Method::SendTransaction(SendTransactionMethod::new(
					descriptor,
					Arc::clone(&workflow),
					SendMethod::new(registry::SEND_RAW_TRANSACTION, workflow),
					CallMethod::new(registry::GET_CHAIN_ID),
					CallMethod::new(registry::GET_TRANSACTION_COUNT),
				))
			}
		};

		tracing::debug!(method = name, kind = ?descriptor.kind, "Created method");
		Ok(method)
	}
}
