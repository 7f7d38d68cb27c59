//! Static method registry.

use txflow_types::MethodDescriptor;

pub const GET_BLOCK_NUMBER: MethodDescriptor = MethodDescriptor::call("eth_blockNumber", 0);
pub const GET_CHAIN_ID: MethodDescriptor = MethodDescriptor::call("eth_chainId", 0);
pub const GET_GAS_PRICE: MethodDescriptor = MethodDescriptor::call("eth_gasPrice", 0);
pub const GET_TRANSACTION_COUNT: MethodDescriptor =
	MethodDescriptor::call("eth_getTransactionCount", 2);
pub const GET_TRANSACTION_RECEIPT: MethodDescriptor =
	MethodDescriptor::call("eth_getTransactionReceipt", 1);
pub const GET_BALANCE: MethodDescriptor = MethodDescriptor::call("eth_getBalance", 2);
pub const GET_BLOCK_BY_NUMBER: MethodDescriptor = MethodDescriptor::call("eth_getBlockByNumber", 2);
pub const ESTIMATE_GAS: MethodDescriptor = MethodDescriptor::call("eth_estimateGas", 1);
pub const CALL: MethodDescriptor = MethodDescriptor::call("eth_call", 2);
pub const SEND_RAW_TRANSACTION: MethodDescriptor =
	MethodDescriptor::send("eth_sendRawTransaction", 1);
pub const SEND_TRANSACTION: MethodDescriptor =
	MethodDescriptor::send_transaction("eth_sendTransaction", 1);

/// Public method names and their descriptors.
pub const METHODS: &[(&str, MethodDescriptor)] = &[
	("getBlockNumber", GET_BLOCK_NUMBER),
	("getChainId", GET_CHAIN_ID),
	("getGasPrice", GET_GAS_PRICE),
	("getTransactionCount", GET_TRANSACTION_COUNT),
	("getTransactionReceipt", GET_TRANSACTION_RECEIPT),
	("getBalance", GET_BALANCE),
	("getBlockByNumber", GET_BLOCK_BY_NUMBER),
	("estimateGas", ESTIMATE_GAS),
	("call", CALL),
	("sendRawTransaction", SEND_RAW_TRANSACTION),
	("sendTransaction", SEND_TRANSACTION),
];

pub fn lookup(name: &str) -> Option<MethodDescriptor> {
	METHODS
		.iter()
		.find(|(method, _)| *method == name)
		.map(|(_, descriptor)| *descriptor)
}
