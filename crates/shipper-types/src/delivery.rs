//! Delivery types: where a strategy goes, what relaying it costs, and how the
//! submission ended.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Percentage of the quoted native fee that is actually sent (20% margin).
pub const FEE_MARGIN_PERCENT: u64 = 120;

/// Connector error codes that mean the user declined in the wallet.
pub const USER_REJECTION_CODES: &[&str] = &["user_rejected"];

/// Code reported when the connector answers with an unknown status or not at all.
pub const UNEXPECTED_STATUS_CODE: &str = "unexpected_status";

/// Code reported when an error payload carries no code of its own.
pub const UNKNOWN_ERROR_CODE: &str = "unknown_error";

/// A destination for a strategy: the messaging endpoint id of the destination
/// chain and the contract that will create the strategy there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationTarget {
	pub eid: u32,
	pub address: Address,
}

impl DestinationTarget {
	/// Creates a target on the chain with endpoint id `eid`.
	pub fn new(eid: u32, address: Address) -> Self {
		Self { eid, address }
	}
}

impl fmt::Display for DestinationTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.address, self.eid)
	}
}

/// Relay cost reported by the composer's quote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
	pub native_fee: U256,
	pub alternate_token_fee: U256,
}

impl FeeQuote {
	/// Creates a quote with no alternate token fee.
	pub fn new(native_fee: U256) -> Self {
		Self {
			native_fee,
			alternate_token_fee: U256::ZERO,
		}
	}

	/// Native value to attach to the shipping call: `native_fee * 120 / 100`,
	/// truncated. Saturates at `U256::MAX` only when the result does not fit.
	pub fn value_to_send(&self) -> U256 {
		// n * 120 / 100 == n + n / 5 exactly, without the wide intermediate.
		let margin_divisor = U256::from(100 / (FEE_MARGIN_PERCENT - 100));
		self.native_fee.saturating_add(self.native_fee / margin_divisor)
	}
}

/// Diagnostic fields a connector may attach to an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub debug_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
	/// Detail carrying only a message.
	pub fn message(message: impl Into<String>) -> Self {
		Self {
			message: Some(message.into()),
			..Default::default()
		}
	}

	pub fn is_empty(&self) -> bool {
		self.message.is_none() && self.debug_url.is_none() && self.details.is_none()
	}
}

impl fmt::Display for ErrorDetail {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut parts = Vec::new();
		if let Some(message) = &self.message {
			parts.push(message.clone());
		}
		if let Some(url) = &self.debug_url {
			parts.push(format!("debug: {}", url));
		}
		if let Some(details) = &self.details {
			parts.push(details.to_string());
		}
		write!(f, "{}", parts.join(" - "))
	}
}

/// Result of handing a shipping transaction to the wallet connector.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
	/// Accepted by the connector. The id is connector-assigned, not a chain hash.
	Success { transaction_id: String },
	/// The user declined the transaction in the wallet.
	Rejected {
		code: String,
		detail: Option<ErrorDetail>,
	},
	/// Any other non-success answer from the connector.
	ProtocolError {
		code: String,
		detail: Option<ErrorDetail>,
	},
	/// The connector did not answer within the bound. The request may still
	/// complete; its late result is tracked under `submission_id`.
	TimedOut {
		submission_id: String,
		after: Duration,
	},
}

impl SubmissionOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, SubmissionOutcome::Success { .. })
	}

	/// Connector transaction id of a successful submission.
	pub fn transaction_id(&self) -> Option<&str> {
		match self {
			SubmissionOutcome::Success { transaction_id } => Some(transaction_id),
			_ => None,
		}
	}
}

impl fmt::Display for SubmissionOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SubmissionOutcome::Success { transaction_id } => {
				write!(f, "accepted as {}", transaction_id)
			}
			SubmissionOutcome::Rejected { code, .. } => write!(f, "rejected by user ({})", code),
			SubmissionOutcome::ProtocolError { code, detail } => match detail {
				Some(detail) if !detail.is_empty() => write!(f, "failed: {} - {}", code, detail),
				_ => write!(f, "failed: {}", code),
			},
			SubmissionOutcome::TimedOut { after, .. } => {
				write!(f, "no answer after {}s", after.as_secs())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_value_to_send_applies_margin() {
		let quote = FeeQuote::new(U256::from(1_000_000_000_000_000u64));
		assert_eq!(quote.value_to_send(), U256::from(1_200_000_000_000_000u64));
	}

	#[test]
	fn test_value_to_send_truncates() {
		// 7 * 120 / 100 = 8.4
		assert_eq!(FeeQuote::new(U256::from(7u64)).value_to_send(), U256::from(8u64));
		assert_eq!(FeeQuote::new(U256::ZERO).value_to_send(), U256::ZERO);
	}

	#[test]
	fn test_value_to_send_never_below_fee() {
		for fee in [0u64, 1, 4, 5, 99, 12_345, u64::MAX] {
			let quote = FeeQuote::new(U256::from(fee));
			assert!(quote.value_to_send() >= quote.native_fee);
		}
		assert_eq!(FeeQuote::new(U256::MAX).value_to_send(), U256::MAX);
	}

	#[test]
	fn test_value_to_send_large_fee_keeps_margin() {
		// n * 120 overflows 256 bits here but n * 1.2 still fits.
		let fee = U256::MAX / U256::from(100u64);
		let quote = FeeQuote::new(fee);
		assert_eq!(quote.value_to_send(), fee + fee / U256::from(5u64));
		assert!(quote.value_to_send() < U256::MAX);

		// largest fee whose margin still fits
		let edge = U256::MAX / U256::from(6u64) * U256::from(5u64);
		assert_eq!(
			FeeQuote::new(edge).value_to_send(),
			edge + edge / U256::from(5u64)
		);
	}

	#[test]
	fn test_error_detail_display() {
		let detail = ErrorDetail {
			message: None,
			debug_url: Some("https://debug/1".to_string()),
			details: Some(serde_json::json!({"reason": "gas"})),
		};
		assert_eq!(
			detail.to_string(),
			r#"debug: https://debug/1 - {"reason":"gas"}"#
		);
	}
}
