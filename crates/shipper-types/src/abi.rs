//! Solidity definitions shared by the encoder and the composer calls.

use alloy_sol_types::sol;

sol! {
	#![sol(all_derives)]

	/// Stableswap strategy as decoded by the destination contract.
	struct StableswapStrategy {
		address maker;
		bytes32 token0Id;
		bytes32 token1Id;
		uint256 feeBps;
		uint256 amplificationFactor;
		bytes32 salt;
	}

	/// Concentrated liquidity strategy as decoded by the destination contract.
	struct ConcentratedStrategy {
		address maker;
		bytes32 token0Id;
		bytes32 token1Id;
		uint256 feeBps;
		uint256 priceLower;
		uint256 priceUpper;
		bytes32 salt;
	}

	/// Source-chain composer that relays strategies to the destination chain.
	interface IStrategyComposer {
		function shipStrategyToChain(
			uint32 dstEid,
			address dstApp,
			bytes strategy,
			bytes32[] tokenIds,
			uint256[] amounts,
			bytes options
		) external payable;

		function quoteShipStrategy(
			uint32 dstEid,
			address dstApp,
			bytes strategy,
			bytes32[] tokenIds,
			uint256[] amounts,
			bytes options,
			bool payInLzToken
		) external view returns (uint256 nativeFee, uint256 lzTokenFee);
	}
}

/// Name of the shipping function.
pub const SHIP_STRATEGY_FUNCTION: &str = "shipStrategyToChain";

/// Human-readable signature of the shipping function, as shown by wallets.
pub const SHIP_STRATEGY_SIGNATURE: &str =
	"function shipStrategyToChain(uint32 dstEid, address dstApp, bytes strategy, bytes32[] tokenIds, uint256[] amounts, bytes options) payable";
