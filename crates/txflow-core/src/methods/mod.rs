//! RPC methods.
//!
//! Three construction shapes exist, selected by [`MethodKind`]:
//! [`CallMethod`] for one-shot requests, [`SendMethod`] for submissions
//! tracked by a confirmation workflow, and [`SendTransactionMethod`] which
//! additionally owns its signing-path helpers.

pub mod call;
pub mod registry;
pub mod send;
pub mod send_transaction;

pub use call::CallMethod;
pub use send::SendMethod;
pub use send_transaction::SendTransactionMethod;

use crate::handle::PendingTransaction;
use crate::module::ModuleContext;
use crate::MethodError;
use serde_json::Value;
use std::sync::Arc;
use txflow_types::{MethodDescriptor, MethodKind};

/// A wired method ready to execute.
#[derive(Clone)]
pub enum Method {
	Call(CallMethod),
	Send(SendMethod),
	SendTransaction(SendTransactionMethod),
}

/// What executing a method produced.
pub enum MethodOutput {
	/// Result of a one-shot call.
	Value(Value),
	/// Tracking handle of a submitted transaction.
	Pending(PendingTransaction),
}

impl Method {
	pub fn descriptor(&self) -> &MethodDescriptor {
		match self {
			Method::Call(method) => method.descriptor(),
			Method::Send(method) => method.descriptor(),
			Method::SendTransaction(method) => method.descriptor(),
		}
	}

	pub fn kind(&self) -> MethodKind {
		self.descriptor().kind
	}

	pub fn set_parameters(&mut self, parameters: Vec<Value>) {
		match self {
			Method::Call(method) => method.set_parameters(parameters),
			Method::Send(method) => method.set_parameters(parameters),
			Method::SendTransaction(method) => method.set_parameters(parameters),
		}
	}

	/// Executes the method. Sending methods return as soon as the
	/// submission task is spawned.
	pub async fn execute(&self, module: &Arc<ModuleContext>) -> Result<MethodOutput, MethodError> {
		match self {
			Method::Call(method) => method.execute(module).await.map(MethodOutput::Value),
			Method::Send(method) => method.execute(module).map(MethodOutput::Pending),
			Method::SendTransaction(method) => method.execute(module).map(MethodOutput::Pending),
		}
	}
}
