//! Account management module for the txflow pipeline.
//!
//! This module provides the signing side of transaction submission: the
//! [`TransactionSigner`] capability, a local signer backed by managed wallet
//! keys, the [`Wallet`] that stores those keys, and the selection of the
//! signing path a given submission takes.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use txflow_types::{Address, PrivateKey, SignedTransaction, TransactionRequest};

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

mod wallet;

pub use implementations::local::LocalTransactionSigner;
pub use wallet::Wallet;

/// Errors that can occur while signing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
	/// The signer needs a private key and none was supplied.
	#[error("No private key available for signing")]
	MissingKey,
	/// The supplied private key could not be parsed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The request lacks a field the signature must cover.
	#[error("Cannot sign transaction without {0}")]
	MissingField(&'static str),
	/// The signer itself failed.
	#[error("Signing failed: {0}")]
	Failed(String),
}

/// Capability that turns a completed request into a raw transaction.
///
/// Implementations receive the managed wallet key for the sender when the
/// submission runs on the managed-wallet path, and `None` when they are an
/// externally supplied signer holding their own keys.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
	/// Signs `request`, returning the encoded payload and its hash.
	async fn sign(
		&self,
		request: &TransactionRequest,
		private_key: Option<&PrivateKey>,
	) -> Result<SignedTransaction, SigningError>;
}

/// The signer a module is configured with.
#[derive(Clone, Default)]
pub enum SignerConfig {
	/// No custom signer: wallet accounts are signed locally and everything
	/// else is signed by the node.
	#[default]
	Default,
	/// A caller-supplied signer used for every sender without a wallet key.
	External(Arc<dyn TransactionSigner>),
}

impl fmt::Debug for SignerConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SignerConfig::Default => f.write_str("Default"),
			SignerConfig::External(_) => f.write_str("External(..)"),
		}
	}
}

/// How a single submission gets its signature.
#[derive(Clone)]
pub enum SigningPath {
	/// The wallet holds a key for the sender; sign locally with it.
	ManagedWallet(PrivateKey),
	/// Hand the request to the configured external signer.
	ExternalSigner(Arc<dyn TransactionSigner>),
	/// Let the node sign through `eth_sendTransaction`.
	NodeManaged,
}

impl SigningPath {
	/// Whether this path signs on the client side.
	pub fn signs_locally(&self) -> bool {
		!matches!(self, SigningPath::NodeManaged)
	}
}

impl fmt::Debug for SigningPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SigningPath::ManagedWallet(_) => f.write_str("ManagedWallet"),
			SigningPath::ExternalSigner(_) => f.write_str("ExternalSigner"),
			SigningPath::NodeManaged => f.write_str("NodeManaged"),
		}
	}
}

/// Chooses the signing path for a submission sent from `from`.
///
/// A wallet key for the sender wins, then a configured external signer, and
/// otherwise the node signs.
pub fn select_signing_path(from: &Address, wallet: &Wallet, signer: &SignerConfig) -> SigningPath {
	if let Some(key) = wallet.get(from) {
		return SigningPath::ManagedWallet(key.clone());
	}

	match signer {
		SignerConfig::External(signer) => SigningPath::ExternalSigner(Arc::clone(signer)),
		SignerConfig::Default => SigningPath::NodeManaged,
	}
}
