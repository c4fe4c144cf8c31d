//! Transaction submission through the wallet connector.

use crate::ledger::SubmissionLedger;
use crate::Shipment;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use shipper_connector::{
	ConnectorError, SendTransactionPayload, SendTransactionRequest, TransactionPayload,
	WalletConnector, STATUS_ERROR, STATUS_SUCCESS,
};
use shipper_types::abi::{IStrategyComposer, SHIP_STRATEGY_FUNCTION, SHIP_STRATEGY_SIGNATURE};
use shipper_types::{
	ErrorDetail, SubmissionOutcome, UNEXPECTED_STATUS_CODE, UNKNOWN_ERROR_CODE,
	USER_REJECTION_CODES,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How long to wait for the connector before reporting a timeout.
pub const DEFAULT_SUBMISSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Submits shipping transactions and classifies the connector's answer.
pub struct TransactionSubmitter {
	connector: Arc<dyn WalletConnector>,
	composer: Address,
	timeout: Duration,
	ledger: SubmissionLedger,
}

impl TransactionSubmitter {
	/// Creates a submitter with the default time bound and a fresh ledger.
	pub fn new(connector: Arc<dyn WalletConnector>, composer: Address) -> Self {
		Self {
			connector,
			composer,
			timeout: DEFAULT_SUBMISSION_TIMEOUT,
			ledger: SubmissionLedger::new(),
		}
	}

	/// Sets the bound on waiting for the connector.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Records late results in `ledger` instead of a private one.
	pub fn with_ledger(mut self, ledger: SubmissionLedger) -> Self {
		self.ledger = ledger;
		self
	}

	/// The bound on waiting for the connector.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Late results of submissions that timed out.
	pub fn ledger(&self) -> &SubmissionLedger {
		&self.ledger
	}

	/// The shipping call as presented to the connector.
	pub fn transaction_payload(&self, shipment: &Shipment, value: U256) -> TransactionPayload {
		TransactionPayload {
			address: self.composer.to_checksum(None),
			abi: SHIP_STRATEGY_SIGNATURE.to_string(),
			function_name: SHIP_STRATEGY_FUNCTION.to_string(),
			args: shipment.display_args(),
			value: format!("0x{:x}", value),
			calldata: Bytes::from(shipment.ship_call().abi_encode()),
		}
	}

	/// Submits once. Never retries; a timed-out request keeps running and
	/// its late answer is recorded in the ledger.
	pub async fn submit(&self, shipment: &Shipment, value: U256) -> SubmissionOutcome {
		let submission_id = Uuid::new_v4().to_string();
		let request = SendTransactionRequest {
			transactions: vec![self.transaction_payload(shipment, value)],
		};
		info!(
			%submission_id,
			target = %shipment.target,
			%value,
			timeout_secs = self.timeout.as_secs(),
			"Submitting shipping transaction"
		);
		debug!(request = ?request, "Connector request");

		let connector = self.connector.clone();
		let mut task = tokio::spawn(async move { connector.send_transaction(request).await });

		let outcome = match tokio::time::timeout(self.timeout, &mut task).await {
			Ok(Ok(result)) => classify(result),
			Ok(Err(e)) => SubmissionOutcome::ProtocolError {
				code: UNEXPECTED_STATUS_CODE.to_string(),
				detail: Some(ErrorDetail::message(format!("connector task failed: {}", e))),
			},
			Err(_) => {
				warn!(
					%submission_id,
					after_secs = self.timeout.as_secs(),
					"Connector did not answer in time, tracking the request"
				);
				self.ledger.track(submission_id.clone(), task);
				SubmissionOutcome::TimedOut {
					submission_id,
					after: self.timeout,
				}
			}
		};

		match &outcome {
			SubmissionOutcome::Success { transaction_id } => {
				info!(%transaction_id, "Shipping transaction accepted")
			}
			SubmissionOutcome::Rejected { code, .. } => {
				info!(%code, "Shipping transaction rejected by user")
			}
			SubmissionOutcome::ProtocolError { .. } => {
				error!(%outcome, "Shipping transaction failed")
			}
			SubmissionOutcome::TimedOut { .. } => {}
		}
		outcome
	}
}

/// Maps a connector answer onto a [`SubmissionOutcome`].
pub fn classify(
	result: Result<Option<SendTransactionPayload>, ConnectorError>,
) -> SubmissionOutcome {
	let payload = match result {
		Ok(Some(payload)) => payload,
		Ok(None) => {
			return SubmissionOutcome::ProtocolError {
				code: UNEXPECTED_STATUS_CODE.to_string(),
				detail: Some(ErrorDetail::message("connector returned no payload")),
			}
		}
		Err(e) => {
			return SubmissionOutcome::ProtocolError {
				code: UNEXPECTED_STATUS_CODE.to_string(),
				detail: Some(ErrorDetail::message(e.to_string())),
			}
		}
	};

	match payload.status.as_str() {
		STATUS_SUCCESS => match payload.transaction_id {
			Some(transaction_id) => SubmissionOutcome::Success { transaction_id },
			None => SubmissionOutcome::ProtocolError {
				code: UNEXPECTED_STATUS_CODE.to_string(),
				detail: Some(ErrorDetail::message("success without a transaction id")),
			},
		},
		STATUS_ERROR => {
			let code = payload
				.error_code
				.unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string());
			let detail = ErrorDetail {
				message: None,
				debug_url: payload.debug_url,
				details: payload.details,
			};
			let detail = (!detail.is_empty()).then_some(detail);
			if USER_REJECTION_CODES.contains(&code.as_str()) {
				SubmissionOutcome::Rejected { code, detail }
			} else {
				SubmissionOutcome::ProtocolError { code, detail }
			}
		}
		other => SubmissionOutcome::ProtocolError {
			code: UNEXPECTED_STATUS_CODE.to_string(),
			detail: Some(ErrorDetail::message(format!("unknown status '{}'", other))),
		},
	}
}
