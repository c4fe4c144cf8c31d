//! HTTP bridge to a wallet connector.
//!
//! The bridge exposes one JSON endpoint per command:
//! `POST {base}/wallet-auth` and `POST {base}/send-transaction`. An empty or
//! `null` body from `send-transaction` means the connector produced no payload.

use crate::{
	ConnectorError, SendTransactionPayload, SendTransactionRequest, WalletAuthPayload,
	WalletAuthRequest, WalletConnector,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Wallet connector reached over HTTP.
///
/// Each command is a JSON `POST` to `{base_url}/{command}`; the answer body
/// is the command payload.
pub struct HttpWalletConnector {
	client: reqwest::Client,
	base_url: String,
	next_id: AtomicU64,
}

impl HttpWalletConnector {
	/// Creates a connector bridge. `request_timeout` bounds each HTTP request.
	pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, ConnectorError> {
		let client = reqwest::Client::builder()
			.timeout(request_timeout)
			.build()
			.map_err(|e| {
				ConnectorError::Configuration(format!("Failed to create HTTP client: {}", e))
			})?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			next_id: AtomicU64::new(0),
		})
	}

	/// The connector base URL, without a trailing slash.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Posts `body` to `{base}/{command}` and returns the raw response text.
	async fn post<B: Serialize>(&self, command: &str, body: &B) -> Result<String, ConnectorError> {
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let url = format!("{}/{}", self.base_url, command);
		debug!(id, %url, "Sending connector command");

		let response = self
			.client
			.post(&url)
			.json(body)
			.send()
			.await
			.map_err(|e| ConnectorError::Transport(format!("failed to send request: {}", e)))?;
		let status = response.status();
		let text = response.text().await.map_err(|e| {
			ConnectorError::Transport(format!("failed to get response body: {}", e))
		})?;
		debug!(id, status = status.as_u16(), body = ?text.trim(), "Received connector response");

		if !status.is_success() {
			return Err(ConnectorError::Status {
				status: status.as_u16(),
				body: text,
			});
		}
		Ok(text)
	}
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, ConnectorError> {
	serde_json::from_str(text).map_err(|e| ConnectorError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl WalletConnector for HttpWalletConnector {
	async fn wallet_auth(
		&self,
		request: WalletAuthRequest,
	) -> Result<WalletAuthPayload, ConnectorError> {
		let text = self.post("wallet-auth", &request).await?;
		parse(&text)
	}

	async fn send_transaction(
		&self,
		request: SendTransactionRequest,
	) -> Result<Option<SendTransactionPayload>, ConnectorError> {
		let text = self.post("send-transaction", &request).await?;
		if text.trim().is_empty() {
			return Ok(None);
		}
		parse::<Option<SendTransactionPayload>>(&text)
	}
}
