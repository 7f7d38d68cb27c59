mod common;

use async_trait::async_trait;
use common::*;
use serde_json::json;
use std::sync::Arc;
use tokio_stream::StreamExt;
use txflow_account::{LocalTransactionSigner, SigningError, TransactionSigner, Wallet};
use txflow_core::{MethodError, ModuleOptions, TransactionEvent};
use txflow_types::{PrivateKey, SignedTransaction, TransactionRequest, U256};

struct RejectingSigner;

#[async_trait]
impl TransactionSigner for RejectingSigner {
	async fn sign(
		&self,
		_request: &TransactionRequest,
		_private_key: Option<&PrivateKey>,
	) -> Result<SignedTransaction, SigningError> {
		Err(SigningError::Failed("hardware wallet locked".to_string()))
	}
}

#[tokio::test]
async fn test_node_managed_sends_transaction() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let module = Arc::new(module(&transport, &subscriptions, options(0, 50)));
	transport.respond("eth_getTransactionReceipt", receipt_json(1, 21000));

	let pending = send_transaction(&module, transfer_from(foreign_address()))
		.await
		.unwrap();
	subscriptions.next_feed().await.push(17).await;
	pending.await.unwrap();

	assert_eq!(transport.count("eth_sendTransaction"), 1);
	assert_eq!(transport.count("eth_sendRawTransaction"), 0);
	assert_eq!(transport.count("eth_chainId"), 0);
	assert_eq!(transport.count("eth_getTransactionCount"), 0);

	let sent = &transport.params("eth_sendTransaction")[0][0];
	assert_eq!(sent["from"], json!(foreign_address()));
	assert_eq!(sent["gasPrice"], json!("0x3b9aca00"));
	assert_eq!(sent["gas"], json!("0x5208"));
	assert!(sent.get("nonce").is_none());
}

#[tokio::test]
async fn test_external_signer_looks_up_chain_id_and_nonce_once() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let signer = Arc::new(RecordingSigner::observing(&transport));
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50)).with_signer(signer.clone()),
	);
	transport.respond("eth_getTransactionReceipt", receipt_json(1, 21000));

	let pending = send_transaction(&module, transfer_from(foreign_address()))
		.await
		.unwrap();
	subscriptions.next_feed().await.push(17).await;
	pending.await.unwrap();

	// both lookups finish before signing, nothing is broadcast earlier
	let at_sign = signer.node_calls_at_sign.lock().unwrap().clone();
	assert_eq!(at_sign.len(), 1);
	assert!(at_sign[0].contains(&"eth_chainId".to_string()));
	assert!(at_sign[0].contains(&"eth_getTransactionCount".to_string()));
	assert!(!at_sign[0].contains(&"eth_sendRawTransaction".to_string()));

	assert_eq!(transport.count("eth_chainId"), 1);
	assert_eq!(
		transport.params("eth_getTransactionCount"),
		vec![vec![json!(foreign_address()), json!("pending")]]
	);

	let signed = signer.signed.lock().unwrap().clone();
	assert_eq!(signed.len(), 1);
	assert_eq!(signed[0].chain_id, Some(1337));
	assert_eq!(signed[0].nonce, Some(7));
	assert_eq!(signed[0].gas_price, Some(1_000_000_000));
	assert_eq!(*signer.keys_seen.lock().unwrap(), vec![false]);

	assert_eq!(transport.count("eth_sendTransaction"), 0);
	assert_eq!(
		transport.params("eth_sendRawTransaction"),
		vec![vec![json!("0xdeadbeef")]]
	);
}

#[tokio::test]
async fn test_wallet_account_signs_locally() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let wallet = Wallet::from_private_keys([PrivateKey::from(WALLET_KEY)]).unwrap();
	let signer = Arc::new(RecordingSigner::default());
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50))
			.with_wallet(wallet)
			.with_signer(signer.clone()),
	);
	transport.respond("eth_getTransactionReceipt", receipt_json(1, 21000));

	let mut request = transfer_from(wallet_address());
	request["gasPrice"] = json!("0x1");
	let mut pending = send_transaction(&module, request).await.unwrap();
	let mut events = pending.events();

	assert_eq!(events.next().await, Some(TransactionEvent::TransactionHash(tx_hash())));
	let submitted = pending.submitted().unwrap();
	subscriptions.next_feed().await.push(17).await;
	pending.await.unwrap();

	let expected_request = TransactionRequest::new(wallet_address())
		.to(RECIPIENT.parse().unwrap())
		.value(U256::from(1_000_000_000_000_000_000u128))
		.gas(21000)
		.gas_price(1)
		.chain_id(1337)
		.nonce(7);
	let expected = LocalTransactionSigner
		.sign_with_key(&expected_request, &PrivateKey::from(WALLET_KEY))
		.unwrap();

	assert_eq!(submitted.hash, tx_hash());
	assert_eq!(submitted.request, Some(expected_request));
	assert_eq!(
		transport.params("eth_sendRawTransaction"),
		vec![vec![json!(expected.raw_transaction)]]
	);
	// wallet keys take priority over the external signer
	assert!(signer.signed.lock().unwrap().is_empty());
	assert_eq!(transport.count("eth_gasPrice"), 0);
}

#[tokio::test]
async fn test_explicit_zero_nonce_skips_lookup() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let signer = Arc::new(RecordingSigner::default());
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50)).with_signer(signer.clone()),
	);
	transport.respond("eth_getTransactionReceipt", receipt_json(1, 21000));

	let mut request = transfer_from(foreign_address());
	request["nonce"] = json!("0x0");
	request["chainId"] = json!("0x1");
	let pending = send_transaction(&module, request).await.unwrap();
	subscriptions.next_feed().await.push(17).await;
	pending.await.unwrap();

	assert_eq!(transport.count("eth_getTransactionCount"), 0);
	assert_eq!(transport.count("eth_chainId"), 0);
	let signed = signer.signed.lock().unwrap().clone();
	assert_eq!(signed[0].nonce, Some(0));
	assert_eq!(signed[0].chain_id, Some(1));
}

#[tokio::test]
async fn test_preset_gas_price_is_not_fetched() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let module = Arc::new(module(&transport, &subscriptions, options(0, 50)));
	transport.respond("eth_getTransactionReceipt", receipt_json(1, 21000));

	let mut request = transfer_from(foreign_address());
	request["gasPrice"] = json!("0x2540be400");
	let pending = send_transaction(&module, request).await.unwrap();
	subscriptions.next_feed().await.push(17).await;
	pending.await.unwrap();

	assert_eq!(transport.count("eth_gasPrice"), 0);
	assert_eq!(
		transport.params("eth_sendTransaction")[0][0]["gasPrice"],
		json!("0x2540be400")
	);
}

#[tokio::test]
async fn test_module_defaults_fill_request() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let options = ModuleOptions {
		default_account: Some(foreign_address()),
		default_gas: Some(50_000),
		default_gas_price: Some(7),
		..options(0, 50)
	};
	let module = Arc::new(module(&transport, &subscriptions, options));
	transport.respond("eth_getTransactionReceipt", receipt_json(1, 21000));

	let pending = send_transaction(&module, json!({ "to": RECIPIENT }))
		.await
		.unwrap();
	subscriptions.next_feed().await.push(17).await;
	pending.await.unwrap();

	let sent = &transport.params("eth_sendTransaction")[0][0];
	assert_eq!(sent["from"], json!(foreign_address()));
	assert_eq!(sent["gas"], json!("0xc350"));
	assert_eq!(sent["gasPrice"], json!("0x7"));
	assert_eq!(transport.count("eth_gasPrice"), 0);
}

#[tokio::test]
async fn test_missing_from_fails_synchronously() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let module = Arc::new(module(&transport, &subscriptions, options(0, 50)));

	let result = send_transaction(&module, json!({ "to": RECIPIENT })).await;
	assert_eq!(result.err(), Some(MethodError::MissingField("from")));
	assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_local_signing_without_gas_fails_synchronously() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let signer = Arc::new(RecordingSigner::default());
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50)).with_signer(signer.clone()),
	);

	let request = json!({ "from": foreign_address(), "to": RECIPIENT });
	let result = send_transaction(&module, request).await;
	assert_eq!(result.err(), Some(MethodError::MissingField("gas")));
	assert!(transport.calls().is_empty());
	assert!(signer.signed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_request_is_rejected() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let module = Arc::new(module(&transport, &subscriptions, options(0, 50)));

	let result = send_transaction(&module, json!({ "from": "not-an-address" })).await;
	assert!(matches!(result, Err(MethodError::InvalidParameters(_))));
}

#[tokio::test]
async fn test_signing_failure_is_delivered_through_handle() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50)).with_signer(Arc::new(RejectingSigner)),
	);

	let mut pending = send_transaction(&module, transfer_from(foreign_address()))
		.await
		.unwrap();
	let events = pending.events();
	let err = pending.await.unwrap_err();

	assert_eq!(
		err,
		MethodError::Signing(SigningError::Failed("hardware wallet locked".to_string()))
	);
	let events: Vec<_> = events.collect().await;
	assert_eq!(events, vec![TransactionEvent::Error(err)]);
	assert_eq!(transport.count("eth_sendRawTransaction"), 0);
}

/// Sends through an external signer and expects `expected` as the only
/// outcome, with nothing signed or broadcast.
async fn assert_fails_before_signing(
	transport: Arc<MockTransport>,
	expected: impl Fn(&MethodError) -> bool,
) {
	let subscriptions = MockSubscriptions::new();
	let signer = Arc::new(RecordingSigner::default());
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50)).with_signer(signer.clone()),
	);

	let mut pending = send_transaction(&module, transfer_from(foreign_address()))
		.await
		.unwrap();
	let events = pending.events();
	let err = pending.await.unwrap_err();

	assert!(expected(&err), "unexpected error {:?}", err);
	let events: Vec<_> = events.collect().await;
	assert_eq!(events, vec![TransactionEvent::Error(err)]);
	assert!(signer.signed.lock().unwrap().is_empty());
	assert_eq!(transport.count("eth_sendRawTransaction"), 0);
	assert!(subscriptions.unsubscribed().is_empty());
}

#[tokio::test]
async fn test_gas_price_lookup_failure_is_delivered_through_handle() {
	let transport = MockTransport::new();
	transport.fail(
		"eth_gasPrice",
		txflow_transport::RpcError::new(-32000, "gas oracle unavailable"),
	);

	assert_fails_before_signing(transport.clone(), |err| {
		matches!(err, MethodError::Rpc(e) if e.message == "gas oracle unavailable")
	})
	.await;
	assert_eq!(transport.count("eth_chainId"), 0);
}

#[tokio::test]
async fn test_chain_id_lookup_failure_is_delivered_through_handle() {
	let transport = MockTransport::new();
	transport.fail(
		"eth_chainId",
		txflow_transport::RpcError::new(-32603, "chain id unavailable"),
	);

	assert_fails_before_signing(transport.clone(), |err| {
		matches!(err, MethodError::Rpc(e) if e.message == "chain id unavailable")
	})
	.await;
	assert_eq!(transport.count("eth_getTransactionCount"), 0);
}

#[tokio::test]
async fn test_nonce_lookup_failure_is_delivered_through_handle() {
	let transport = MockTransport::new();
	transport.fail(
		"eth_getTransactionCount",
		txflow_transport::RpcError::new(-32603, "header not found"),
	);

	assert_fails_before_signing(transport.clone(), |err| {
		matches!(err, MethodError::Rpc(e) if e.message == "header not found")
	})
	.await;
	assert_eq!(transport.count("eth_chainId"), 1);
}

#[tokio::test]
async fn test_malformed_chain_id_is_decode_error() {
	let transport = MockTransport::new();
	transport.respond("eth_chainId", json!("not-hex"));

	assert_fails_before_signing(transport, |err| matches!(err, MethodError::Decode(_))).await;
}

#[tokio::test]
async fn test_cancel_during_gas_price_lookup_prevents_send() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let signer = Arc::new(RecordingSigner::default());
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50)).with_signer(signer.clone()),
	);
	let gas_price = transport.hold("eth_gasPrice");

	let mut pending = send_transaction(&module, transfer_from(foreign_address()))
		.await
		.unwrap();
	let events = pending.events();
	pending.cancel();
	gas_price.notify_one();

	assert_eq!(pending.await, Err(MethodError::Cancelled));
	let events: Vec<_> = events.collect().await;
	assert_eq!(events, vec![TransactionEvent::Error(MethodError::Cancelled)]);
	assert!(signer.signed.lock().unwrap().is_empty());
	assert_eq!(transport.count("eth_sendRawTransaction"), 0);
}

#[tokio::test]
async fn test_cancel_during_nonce_lookup_prevents_broadcast() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	let signer = Arc::new(RecordingSigner::default());
	let module = Arc::new(
		module(&transport, &subscriptions, options(0, 50)).with_signer(signer.clone()),
	);
	let nonce = transport.hold("eth_getTransactionCount");

	let mut pending = send_transaction(&module, transfer_from(foreign_address()))
		.await
		.unwrap();
	let events = pending.events();
	while transport.count("eth_getTransactionCount") == 0 {
		tokio::task::yield_now().await;
	}
	pending.cancel();
	nonce.notify_one();

	assert_eq!(pending.await, Err(MethodError::Cancelled));
	let events: Vec<_> = events.collect().await;
	assert_eq!(events, vec![TransactionEvent::Error(MethodError::Cancelled)]);
	assert_eq!(transport.count("eth_sendRawTransaction"), 0);
	assert!(subscriptions.unsubscribed().is_empty());
}

#[tokio::test]
async fn test_rejected_submission_opens_no_subscription() {
	let transport = MockTransport::new();
	let subscriptions = MockSubscriptions::new();
	// queued ahead of the default success answer
	transport.fail(
		"eth_sendTransaction",
		txflow_transport::RpcError::new(-32000, "insufficient funds"),
	);
	let module = Arc::new(module(&transport, &subscriptions, options(0, 50)));

	let mut pending = send_transaction(&module, transfer_from(foreign_address()))
		.await
		.unwrap();
	let events = pending.events();
	let err = pending.await.unwrap_err();

	assert!(matches!(err, MethodError::Rpc(ref e) if e.message == "insufficient funds"));
	let events: Vec<_> = events.collect().await;
	assert_eq!(events, vec![TransactionEvent::Error(err)]);
	assert_eq!(transport.count("eth_getTransactionReceipt"), 0);
	assert!(subscriptions.unsubscribed().is_empty());
}
