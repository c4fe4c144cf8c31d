use shipper_account::AccountError;
use shipper_delivery::QuoteError;
use shipper_strategy::EncodingError;
use shipper_types::ErrorDetail;
use std::time::Duration;
use thiserror::Error;

fn with_detail(detail: &Option<ErrorDetail>) -> String {
	match detail {
		Some(detail) if !detail.is_empty() => format!(" - {}", detail),
		_ => String::new(),
	}
}

/// Why a ship action did not produce a receipt.
#[derive(Error, Debug)]
pub enum ShipError {
	#[error("Not authenticated: {0}")]
	NotAuthenticated(String),

	#[error("Invalid strategy: {0}")]
	Encoding(#[from] EncodingError),

	#[error("Fee quote unavailable: {0}")]
	QuoteUnavailable(String),

	#[error("Submission {submission_id} got no answer after {}s; it may still complete", .after.as_secs())]
	TimedOut {
		submission_id: String,
		after: Duration,
	},

	#[error("Transaction rejected by user ({code})")]
	Rejected {
		code: String,
		detail: Option<ErrorDetail>,
	},

	#[error("Transaction failed: {code}{}", with_detail(.detail))]
	Protocol {
		code: String,
		detail: Option<ErrorDetail>,
	},

	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl ShipError {
	/// Whether the user may simply try the same action again. A timed-out
	/// submission may still land, so check the ledger before retrying it.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			ShipError::QuoteUnavailable(_) | ShipError::TimedOut { .. }
		)
	}
}

impl From<AccountError> for ShipError {
	fn from(err: AccountError) -> Self {
		match err {
			AccountError::NotAuthenticated(reason) => ShipError::NotAuthenticated(reason),
		}
	}
}

impl From<QuoteError> for ShipError {
	fn from(err: QuoteError) -> Self {
		match err {
			QuoteError::Unavailable(reason) => ShipError::QuoteUnavailable(reason),
		}
	}
}
