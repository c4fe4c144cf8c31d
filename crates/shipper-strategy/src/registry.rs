//! Canonical asset identifiers.
//!
//! Assets are fixed per deployment. Each one is named by a symbol whose
//! keccak-256 digest is the identifier both chains agree on.

use alloy_primitives::keccak256;
use shipper_types::CanonicalAssetId;

/// Returns the canonical identifier for a symbolic asset name.
pub fn identifier_for(symbol: &str) -> CanonicalAssetId {
	CanonicalAssetId(keccak256(symbol.as_bytes()))
}

/// The two assets every strategy of this deployment pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPair {
	symbols: [String; 2],
	ids: [CanonicalAssetId; 2],
}

impl AssetPair {
	/// Creates a pair from two symbols, in strategy order.
	pub fn new(symbol0: impl Into<String>, symbol1: impl Into<String>) -> Self {
		let symbols = [symbol0.into(), symbol1.into()];
		let ids = [identifier_for(&symbols[0]), identifier_for(&symbols[1])];
		Self { symbols, ids }
	}

	/// Symbolic names in strategy order: asset0, asset1.
	pub fn symbols(&self) -> &[String; 2] {
		&self.symbols
	}

	/// Identifiers in strategy order: asset0, asset1.
	pub fn ids(&self) -> [CanonicalAssetId; 2] {
		self.ids
	}
}

impl Default for AssetPair {
	fn default() -> Self {
		Self::new("USDC", "USDT")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::b256;

	#[test]
	fn test_identifier_is_keccak_of_symbol() {
		// keccak256("USDC")
		assert_eq!(
			identifier_for("USDC").0,
			b256!("0xd6aca1be9729c13d677335161321649cccae6a591554772516700f986f942eaa")
		);
	}

	#[test]
	fn test_identifier_is_deterministic() {
		assert_eq!(identifier_for("USDT"), identifier_for("USDT"));
		assert_ne!(identifier_for("USDC"), identifier_for("USDT"));
		assert_ne!(identifier_for("usdc"), identifier_for("USDC"));
	}

	#[test]
	fn test_asset_pair_order() {
		let pair = AssetPair::default();
		assert_eq!(pair.ids(), [identifier_for("USDC"), identifier_for("USDT")]);
		assert_eq!(pair.symbols()[1], "USDT");
	}
}
