//! In-memory wallet of managed accounts.

use crate::SigningError;
use alloy::signers::local::PrivateKeySigner;
use std::collections::HashMap;
use txflow_types::{Address, PrivateKey};

/// Private keys indexed by the address they control.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
	accounts: HashMap<Address, PrivateKey>,
}

impl Wallet {
	/// Builds a wallet from hex private keys, deriving each address.
	pub fn from_private_keys(
		keys: impl IntoIterator<Item = PrivateKey>,
	) -> Result<Self, SigningError> {
		let mut wallet = Self::default();
		for key in keys {
			wallet.add(key)?;
		}
		Ok(wallet)
	}

	/// Adds a key and returns the address it controls.
	pub fn add(&mut self, key: PrivateKey) -> Result<Address, SigningError> {
		let address = parse_signer(&key)?.address();
		self.accounts.insert(address, key);
		Ok(address)
	}

	/// Looks up the key for `address`.
	pub fn get(&self, address: &Address) -> Option<&PrivateKey> {
		self.accounts.get(address)
	}

	pub fn len(&self) -> usize {
		self.accounts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.accounts.is_empty()
	}
}

pub(crate) fn parse_signer(key: &PrivateKey) -> Result<PrivateKeySigner, SigningError> {
	key.with_exposed(|k| k.parse::<PrivateKeySigner>())
		.map_err(|_| SigningError::InvalidKey("malformed secp256k1 private key".to_string()))
}
