//! One-shot request/response methods.

use crate::module::ModuleContext;
use crate::MethodError;
use serde_json::Value;
use txflow_types::MethodDescriptor;

#[derive(Debug, Clone)]
pub struct CallMethod {
	descriptor: MethodDescriptor,
	parameters: Vec<Value>,
}

impl CallMethod {
	pub fn new(descriptor: MethodDescriptor) -> Self {
		Self {
			descriptor,
			parameters: Vec::new(),
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

	pub fn validate_arguments(&self, given: usize) -> Result<(), MethodError> {
		validate_arguments(&self.descriptor, given)
	}

	/// Executes with the stored parameters.
	pub async fn execute(&self, module: &ModuleContext) -> Result<Value, MethodError> {
		self.call(module, self.parameters.clone()).await
	}

	/// Executes with explicit parameters, leaving the stored ones untouched.
	pub async fn call(
		&self,
		module: &ModuleContext,
		parameters: Vec<Value>,
	) -> Result<Value, MethodError> {
		self.validate_arguments(parameters.len())?;
		tracing::debug!(method = self.descriptor.rpc_method, "Executing call");
		Ok(module
			.transport()
			.call(self.descriptor.rpc_method, parameters)
			.await?)
	}
}

pub(crate) fn validate_arguments(
	descriptor: &MethodDescriptor,
	given: usize,
) -> Result<(), MethodError> {
	if given != descriptor.parameters {
		return Err(MethodError::InvalidArguments {
			method: descriptor.rpc_method,
			expected: descriptor.parameters,
			given,
		});
	}
	Ok(())
}
