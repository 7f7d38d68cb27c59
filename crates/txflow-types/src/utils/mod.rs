//! Utility functions for hex quantities and display formatting.

pub mod formatting;
pub mod quantity;

pub use formatting::{truncate_id, without_0x_prefix};
pub use quantity::{parse_quantity, parse_quantity_u128, QuantityError};
