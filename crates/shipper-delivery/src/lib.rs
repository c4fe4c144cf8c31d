//! Delivery module for the strategy shipper.
//!
//! Everything that happens after a strategy is encoded: building the composer
//! calls, quoting the relay fee over a read-only RPC call, and handing the
//! value-bearing transaction to the wallet connector under a time bound.

use alloy_primitives::{hex, Address, Bytes, U256};
use async_trait::async_trait;
use shipper_types::abi::IStrategyComposer;
use shipper_types::{CanonicalAssetId, DestinationTarget, EncodedStrategy};
use thiserror::Error;

pub mod ledger;
pub mod options;
pub mod quote;
pub mod submit;

/// Re-export implementations
pub mod implementations {
	pub mod rpc;
}

pub use implementations::rpc::JsonRpcClient;
pub use ledger::{LateStatus, SubmissionLedger};
pub use options::RelayOptions;
pub use quote::FeeQuoter;
pub use submit::{classify, TransactionSubmitter, DEFAULT_SUBMISSION_TIMEOUT};

/// Errors returned by a [`CallProvider`].
#[derive(Debug, Error)]
pub enum RpcError {
	#[error("RPC transport error: {0}")]
	Transport(String),
	#[error("RPC endpoint returned HTTP {0}")]
	Status(u16),
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	#[error("Invalid RPC response: {0}")]
	InvalidResponse(String),
}

/// Errors returned by the [`FeeQuoter`].
#[derive(Debug, Error)]
pub enum QuoteError {
	/// The fee could not be obtained or decoded.
	#[error("Fee quote unavailable: {0}")]
	Unavailable(String),
}

impl From<RpcError> for QuoteError {
	fn from(err: RpcError) -> Self {
		QuoteError::Unavailable(err.to_string())
	}
}

/// Read-only contract calls on the source chain.
#[async_trait]
pub trait CallProvider: Send + Sync {
	/// Executes `data` against `to` at the latest block and returns the raw output.
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError>;
}

/// Everything the composer needs to relay one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
	pub target: DestinationTarget,
	pub strategy: EncodedStrategy,
	pub asset_ids: [CanonicalAssetId; 2],
	pub amounts: [U256; 2],
	pub options: Bytes,
}

impl Shipment {
	fn token_ids(&self) -> Vec<alloy_primitives::B256> {
		self.asset_ids.iter().map(|id| id.as_b256()).collect()
	}

	/// Builds the fee quote call, always paying in the native token.
	pub fn quote_call(&self) -> IStrategyComposer::quoteShipStrategyCall {
		IStrategyComposer::quoteShipStrategyCall {
			dstEid: self.target.eid,
			dstApp: self.target.address,
			strategy: self.strategy.as_bytes().clone(),
			tokenIds: self.token_ids(),
			amounts: self.amounts.to_vec(),
			options: self.options.clone(),
			payInLzToken: false,
		}
	}

	/// Builds the value-bearing shipping call.
	pub fn ship_call(&self) -> IStrategyComposer::shipStrategyToChainCall {
		IStrategyComposer::shipStrategyToChainCall {
			dstEid: self.target.eid,
			dstApp: self.target.address,
			strategy: self.strategy.as_bytes().clone(),
			tokenIds: self.token_ids(),
			amounts: self.amounts.to_vec(),
			options: self.options.clone(),
		}
	}

	/// Shipping call arguments in the JSON form wallets display.
	pub fn display_args(&self) -> Vec<serde_json::Value> {
		vec![
			serde_json::Value::from(self.target.eid),
			serde_json::Value::String(self.target.address.to_checksum(None)),
			serde_json::Value::String(hex::encode_prefixed(self.strategy.as_bytes())),
			serde_json::Value::Array(
				self.asset_ids
					.iter()
					.map(|id| serde_json::Value::String(id.to_string()))
					.collect(),
			),
			serde_json::Value::Array(
				self.amounts
					.iter()
					.map(|amount| serde_json::Value::String(amount.to_string()))
					.collect(),
			),
			serde_json::Value::String(hex::encode_prefixed(&self.options)),
		]
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use alloy_sol_types::SolCall;

	#[test]
	fn test_calls_share_arguments() {
		let shipment = test_support::shipment();
		let quote = shipment.quote_call().abi_encode();
		let ship = shipment.ship_call().abi_encode();

		assert_eq!(
			&quote[..4],
			IStrategyComposer::quoteShipStrategyCall::SELECTOR.as_slice()
		);
		assert_eq!(
			&ship[..4],
			IStrategyComposer::shipStrategyToChainCall::SELECTOR.as_slice()
		);

		let decoded = IStrategyComposer::quoteShipStrategyCall::abi_decode(&quote).unwrap();
		assert_eq!(decoded.dstEid, 30184);
		assert!(!decoded.payInLzToken);
		assert_eq!(decoded.strategy.len(), 192);
	}

	#[test]
	fn test_display_args() {
		let args = test_support::shipment().display_args();
		assert_eq!(args.len(), 6);
		assert_eq!(args[0], serde_json::json!(30184));
		assert_eq!(
			args[1],
			serde_json::json!("0xeb99024504f5e73Fc857E4B2a0CF076C7F91fa2E")
		);
		assert_eq!(args[4], serde_json::json!(["2000000", "2000000"]));
		assert_eq!(
			args[5],
			serde_json::json!("0x000301001101000000000000000000000000000493e0")
		);
	}
}
