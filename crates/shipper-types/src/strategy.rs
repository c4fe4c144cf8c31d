//! Strategy types for the shipper.
//!
//! A [`StrategyRequest`] is what the user submits: loosely typed numbers as
//! they arrive from a form or a command line. The encoder validates it into a
//! [`StrategyDescriptor`], whose fields map one to one onto the tuple the
//! destination contract decodes, and serializes that into an
//! [`EncodedStrategy`].

use alloy_primitives::{hex, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exclusive upper bound for fees expressed in basis points.
pub const MAX_FEE_BPS: i64 = 10_000;

/// Amplification factor used when a stableswap request leaves it out.
pub const DEFAULT_AMPLIFICATION_FACTOR: i64 = 100;

/// Lower price bound used when a concentrated request leaves it out (0.9e18).
pub const DEFAULT_PRICE_LOWER: &str = "900000000000000000";

/// Upper price bound used when a concentrated request leaves it out (1.1e18).
pub const DEFAULT_PRICE_UPPER: &str = "1100000000000000000";

/// Salt attached to every strategy. Reserved for per-request uniqueness.
pub const STRATEGY_SALT: B256 = B256::ZERO;

/// The kind of liquidity strategy, which also selects the destination contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
	Stableswap,
	Concentrated,
}

impl StrategyKind {
	/// Number of 32-byte words in the encoded tuple for this kind.
	pub fn word_count(&self) -> usize {
		match self {
			StrategyKind::Stableswap => 6,
			StrategyKind::Concentrated => 7,
		}
	}

	/// Exact byte length of an encoded strategy of this kind.
	pub fn encoded_len(&self) -> usize {
		self.word_count() * 32
	}
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StrategyKind::Stableswap => write!(f, "stableswap"),
			StrategyKind::Concentrated => write!(f, "concentrated"),
		}
	}
}

/// A strategy as submitted by the user, before validation.
///
/// Numbers are kept signed and prices are kept as strings so that negative,
/// overflowing or malformed input reaches the encoder and is rejected there
/// with a precise error instead of being lost in a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy_type", rename_all = "snake_case")]
pub enum StrategyRequest {
	Stableswap {
		fee_bps: i64,
		#[serde(default)]
		amplification_factor: Option<i64>,
	},
	Concentrated {
		fee_bps: i64,
		/// 18-decimal fixed point, decimal or `0x`-prefixed hex.
		#[serde(default)]
		price_lower: Option<String>,
		/// 18-decimal fixed point, decimal or `0x`-prefixed hex.
		#[serde(default)]
		price_upper: Option<String>,
	},
}

impl StrategyRequest {
	/// Stableswap request with the default amplification factor.
	pub fn stableswap(fee_bps: i64) -> Self {
		StrategyRequest::Stableswap {
			fee_bps,
			amplification_factor: None,
		}
	}

	/// Concentrated request with the default price range.
	pub fn concentrated(fee_bps: i64) -> Self {
		StrategyRequest::Concentrated {
			fee_bps,
			price_lower: None,
			price_upper: None,
		}
	}

	/// Strategy kind requested.
	pub fn kind(&self) -> StrategyKind {
		match self {
			StrategyRequest::Stableswap { .. } => StrategyKind::Stableswap,
			StrategyRequest::Concentrated { .. } => StrategyKind::Concentrated,
		}
	}

	/// Requested pool fee in basis points, not yet validated.
	pub fn fee_bps(&self) -> i64 {
		match self {
			StrategyRequest::Stableswap { fee_bps, .. }
			| StrategyRequest::Concentrated { fee_bps, .. } => *fee_bps,
		}
	}
}

/// Chain-agnostic 32-byte identifier of an asset.
///
/// The destination chain resolves it to its own local token address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalAssetId(pub B256);

impl CanonicalAssetId {
	/// The identifier as a 32-byte word.
	pub fn as_b256(&self) -> B256 {
		self.0
	}
}

impl From<CanonicalAssetId> for B256 {
	fn from(id: CanonicalAssetId) -> Self {
		id.0
	}
}

impl fmt::Display for CanonicalAssetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", hex::encode_prefixed(self.0))
	}
}

/// Kind-specific strategy parameters after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyParameters {
	Stableswap {
		amplification_factor: U256,
	},
	Concentrated {
		price_lower: U256,
		price_upper: U256,
	},
}

impl StrategyParameters {
	pub fn kind(&self) -> StrategyKind {
		match self {
			StrategyParameters::Stableswap { .. } => StrategyKind::Stableswap,
			StrategyParameters::Concentrated { .. } => StrategyKind::Concentrated,
		}
	}
}

/// A fully validated strategy, field for field what the destination decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyDescriptor {
	pub maker: Address,
	pub asset_ids: [CanonicalAssetId; 2],
	pub fee_bps: U256,
	pub parameters: StrategyParameters,
	pub salt: B256,
}

impl StrategyDescriptor {
	pub fn kind(&self) -> StrategyKind {
		self.parameters.kind()
	}
}

/// ABI-encoded strategy blob together with the kind it was encoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedStrategy {
	kind: StrategyKind,
	bytes: Bytes,
}

impl EncodedStrategy {
	/// Wraps bytes produced by the encoder.
	pub fn new(kind: StrategyKind, bytes: Bytes) -> Self {
		Self { kind, bytes }
	}

	pub fn kind(&self) -> StrategyKind {
		self.kind
	}

	/// The encoded blob.
	pub fn as_bytes(&self) -> &Bytes {
		&self.bytes
	}

	/// Length of the blob in bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

impl fmt::Display for EncodedStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", hex::encode_prefixed(&self.bytes))
	}
}
