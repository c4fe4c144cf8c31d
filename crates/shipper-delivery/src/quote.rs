//! Relay fee quoting.

use crate::{CallProvider, QuoteError, Shipment};
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use shipper_types::abi::IStrategyComposer;
use shipper_types::FeeQuote;
use std::sync::Arc;
use tracing::{debug, info};

/// Asks the source-chain composer what relaying a shipment costs.
pub struct FeeQuoter {
	provider: Arc<dyn CallProvider>,
	composer: Address,
}

impl FeeQuoter {
	/// Creates a quoter calling `composer` through `provider`.
	pub fn new(provider: Arc<dyn CallProvider>, composer: Address) -> Self {
		Self { provider, composer }
	}

	/// Quotes the shipment, paying in the native currency. Read-only.
	pub async fn quote(&self, shipment: &Shipment) -> Result<FeeQuote, QuoteError> {
		let calldata = Bytes::from(shipment.quote_call().abi_encode());
		debug!(
			composer = %self.composer,
			target = %shipment.target,
			calldata_len = calldata.len(),
			"Requesting fee quote"
		);

		let output = self.provider.call(self.composer, calldata).await?;
		let fees = IStrategyComposer::quoteShipStrategyCall::abi_decode_returns(&output)
			.map_err(|e| QuoteError::Unavailable(format!("failed to decode quote: {}", e)))?;

		let quote = FeeQuote {
			native_fee: fees.nativeFee,
			alternate_token_fee: fees.lzTokenFee,
		};
		info!(
			native_fee = %quote.native_fee,
			value_to_send = %quote.value_to_send(),
			"Received fee quote"
		);
		Ok(quote)
	}
}
