//! Parsing of JSON-RPC hex quantities.
//!
//! Nodes encode integers as `0x`-prefixed hex strings without leading zeros.
//! Some development nodes return plain JSON numbers instead; both are
//! accepted.

use super::formatting::without_0x_prefix;
use serde_json::Value;
use thiserror::Error;

/// Error returned when a JSON value is not a valid quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid quantity: {0}")]
pub struct QuantityError(pub String);

/// Parses a quantity that fits in 64 bits.
pub fn parse_quantity(value: &Value) -> Result<u64, QuantityError> {
	parse_quantity_u128(value)
		.and_then(|v| u64::try_from(v).map_err(|_| QuantityError(value.to_string())))
}

/// Parses a quantity that fits in 128 bits, such as a gas price in wei.
pub fn parse_quantity_u128(value: &Value) -> Result<u128, QuantityError> {
	match value {
		Value::String(s) => {
			let digits = without_0x_prefix(s);
			if digits.is_empty() || !s.to_lowercase().starts_with("0x") {
				return Err(QuantityError(s.clone()));
			}
			u128::from_str_radix(digits, 16).map_err(|_| QuantityError(s.clone()))
		}
		Value::Number(n) => n
			.as_u64()
			.map(u128::from)
			.ok_or_else(|| QuantityError(n.to_string())),
		other => Err(QuantityError(other.to_string())),
	}
}
