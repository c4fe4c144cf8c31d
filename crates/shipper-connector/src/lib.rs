//! Wallet connector interface.
//!
//! The wallet connector is the external service through which the user
//! authorizes a sign-in and approves transactions. This crate defines the
//! request and response payloads the shipper exchanges with it, the
//! [`WalletConnector`] trait, and an HTTP bridge implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shipper_types::Bytes;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

pub use implementations::http::HttpWalletConnector;

/// Status reported by the connector when the user approved.
pub const STATUS_SUCCESS: &str = "success";
/// Status reported by the connector when the command failed or was declined.
pub const STATUS_ERROR: &str = "error";

/// Errors that can occur while talking to the wallet connector.
#[derive(Debug, Error)]
pub enum ConnectorError {
	/// The request could not be sent or the response could not be read.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The connector answered with a non-success HTTP status.
	#[error("Connector returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
	/// The response body was not a valid payload.
	#[error("Invalid connector response: {0}")]
	InvalidResponse(String),
	/// The connector could not be set up.
	#[error("Connector configuration error: {0}")]
	Configuration(String),
}

/// Sign-in request shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletAuthRequest {
	pub nonce: String,
	pub request_id: String,
	pub expiration_time: DateTime<Utc>,
	pub not_before: DateTime<Utc>,
	pub statement: String,
}

/// Answer to a [`WalletAuthRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletAuthPayload {
	pub status: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_code: Option<String>,
}

impl WalletAuthPayload {
	/// Returns true when the user signed in.
	pub fn is_success(&self) -> bool {
		self.status == STATUS_SUCCESS
	}
}

/// One contract call the user is asked to approve.
///
/// Besides the raw calldata, the payload carries the human-readable form
/// wallets display: the function name, its ABI signature, the arguments as
/// JSON and the attached value as a hex quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
	pub address: String,
	pub abi: String,
	pub function_name: String,
	pub args: Vec<serde_json::Value>,
	pub value: String,
	pub calldata: Bytes,
}

/// Batch of transactions handed to the wallet in one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendTransactionRequest {
	pub transactions: Vec<TransactionPayload>,
}

/// Answer to a [`SendTransactionRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendTransactionPayload {
	pub status: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transaction_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub debug_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Trait implemented by every wallet connector.
#[async_trait]
pub trait WalletConnector: Send + Sync {
	/// Asks the user to sign in and reveal their wallet address.
	async fn wallet_auth(
		&self,
		request: WalletAuthRequest,
	) -> Result<WalletAuthPayload, ConnectorError>;

	/// Asks the user to approve the given transactions. `None` means the
	/// connector finished without producing a payload.
	async fn send_transaction(
		&self,
		request: SendTransactionRequest,
	) -> Result<Option<SendTransactionPayload>, ConnectorError>;
}
