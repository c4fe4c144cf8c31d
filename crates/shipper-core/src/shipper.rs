//! The shipping pipeline: resolve maker, encode, quote, submit.

use crate::ShipError;
use serde::Serialize;
use shipper_account::AccountInterface;
use shipper_delivery::{FeeQuoter, Shipment, SubmissionLedger, TransactionSubmitter};
use shipper_strategy::StrategyEncoder;
use shipper_types::{
	Address, Bytes, DestinationTarget, FeeQuote, StrategyKind, StrategyRequest,
	SubmissionOutcome, U256,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Destination contract per strategy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destinations {
	pub stableswap: DestinationTarget,
	pub concentrated: DestinationTarget,
}

impl Destinations {
	/// Destination for a strategy kind.
	pub fn target_for(&self, kind: StrategyKind) -> DestinationTarget {
		match kind {
			StrategyKind::Stableswap => self.stableswap,
			StrategyKind::Concentrated => self.concentrated,
		}
	}
}

/// A shipment that has been encoded and quoted but not submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedShipment {
	pub maker: Address,
	pub shipment: Shipment,
	pub quote: FeeQuote,
}

impl PreparedShipment {
	/// Native value to attach, the quoted fee plus the margin.
	pub fn value_to_send(&self) -> U256 {
		self.quote.value_to_send()
	}
}

/// What a successful ship action reports back to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipReceipt {
	/// Connector-assigned id, not an on-chain hash.
	pub transaction_id: String,
	pub kind: StrategyKind,
	pub target: DestinationTarget,
	pub maker: Address,
	pub quote: FeeQuote,
	pub value_sent: U256,
}

/// Runs ship actions. Each action is a single attempt; nothing is retried.
pub struct StrategyShipper {
	account: Arc<dyn AccountInterface>,
	encoder: StrategyEncoder,
	quoter: FeeQuoter,
	submitter: TransactionSubmitter,
	destinations: Destinations,
	amounts: [U256; 2],
	relay_options: Bytes,
}

impl StrategyShipper {
	/// Creates a shipper from its stage components.
	pub fn new(
		account: Arc<dyn AccountInterface>,
		encoder: StrategyEncoder,
		quoter: FeeQuoter,
		submitter: TransactionSubmitter,
		destinations: Destinations,
		amounts: [U256; 2],
		relay_options: Bytes,
	) -> Self {
		Self {
			account,
			encoder,
			quoter,
			submitter,
			destinations,
			amounts,
			relay_options,
		}
	}

	/// The encoder used for every request.
	pub fn encoder(&self) -> &StrategyEncoder {
		&self.encoder
	}

	/// Destination targets per strategy kind.
	pub fn destinations(&self) -> &Destinations {
		&self.destinations
	}

	/// Late results of timed-out submissions.
	pub fn ledger(&self) -> &SubmissionLedger {
		self.submitter.ledger()
	}

	/// Resolves the maker, encodes the strategy and quotes the relay fee.
	/// Has no side effects beyond a possible wallet sign-in.
	#[instrument(skip_all, fields(kind = %request.kind()))]
	pub async fn prepare(&self, request: &StrategyRequest) -> Result<PreparedShipment, ShipError> {
		let maker = self.account.address().await?;
		info!(%maker, "Resolved maker");

		let strategy = self.encoder.encode(maker, request)?;
		let target = self.destinations.target_for(strategy.kind());
		info!(%target, len = strategy.len(), "Encoded strategy");

		let shipment = Shipment {
			target,
			strategy,
			asset_ids: self.encoder.assets().ids(),
			amounts: self.amounts,
			options: self.relay_options.clone(),
		};
		let quote = self.quoter.quote(&shipment).await?;

		Ok(PreparedShipment {
			maker,
			shipment,
			quote,
		})
	}

	/// Runs the whole pipeline once.
	#[instrument(skip_all, fields(kind = %request.kind()))]
	pub async fn ship(&self, request: &StrategyRequest) -> Result<ShipReceipt, ShipError> {
		let prepared = self.prepare(request).await?;
		let value = prepared.value_to_send();

		match self.submitter.submit(&prepared.shipment, value).await {
			SubmissionOutcome::Success { transaction_id } => {
				info!(%transaction_id, %value, "Strategy shipped");
				Ok(ShipReceipt {
					transaction_id,
					kind: prepared.shipment.strategy.kind(),
					target: prepared.shipment.target,
					maker: prepared.maker,
					quote: prepared.quote,
					value_sent: value,
				})
			}
			SubmissionOutcome::Rejected { code, detail } => {
				Err(ShipError::Rejected { code, detail })
			}
			SubmissionOutcome::ProtocolError { code, detail } => {
				error!(%code, "Strategy shipping failed");
				Err(ShipError::Protocol { code, detail })
			}
			SubmissionOutcome::TimedOut {
				submission_id,
				after,
			} => Err(ShipError::TimedOut {
				submission_id,
				after,
			}),
		}
	}
}
