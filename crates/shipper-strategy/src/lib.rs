//! Strategy encoding for the shipper.
//!
//! This crate turns a user's [`StrategyRequest`](shipper_types::StrategyRequest)
//! into the ABI blob the destination contract decodes. Assets are referred to
//! by canonical identifiers derived from their symbolic names, so the same
//! blob is meaningful on any chain.

use thiserror::Error;

pub mod encoder;
pub mod registry;

pub use encoder::StrategyEncoder;
pub use registry::{identifier_for, AssetPair};

/// Errors that can occur while validating or encoding a strategy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
	/// A numeric field was negative.
	#[error("{field} must not be negative, got {value}")]
	Negative { field: &'static str, value: String },
	/// A numeric field could not be parsed or does not fit in 256 bits.
	#[error("{field} is not a valid uint256 ('{value}'): {reason}")]
	InvalidNumber {
		field: &'static str,
		value: String,
		reason: String,
	},
	/// The fee is outside the basis-point range.
	#[error("fee_bps must be below 10000, got {0}")]
	FeeOutOfRange(i64),
	/// The amplification factor must be strictly positive.
	#[error("amplification_factor must be positive, got {0}")]
	InvalidAmplification(i64),
	/// The concentrated price range is empty or inverted.
	#[error("price_lower ({lower}) must be below price_upper ({upper})")]
	InvalidPriceRange { lower: String, upper: String },
	/// An encoded blob did not match the expected layout.
	#[error("Malformed strategy encoding: {0}")]
	Malformed(String),
}
