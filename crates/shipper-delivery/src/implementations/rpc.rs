//! Read-only contract calls over an alloy HTTP provider.

use crate::{CallProvider, RpcError};
use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_transport::{TransportError, TransportErrorKind};
use alloy_transport_http::reqwest::{Client, Url};
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Sends `eth_call` requests to a single HTTP endpoint.
pub struct JsonRpcClient {
	provider: RootProvider,
	url: String,
}

impl JsonRpcClient {
	/// Creates a client for `url`. Every request is bounded by `timeout`.
	pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
		let url = url.into();
		let endpoint: Url = url
			.parse()
			.map_err(|e| RpcError::Transport(format!("Invalid RPC URL '{}': {}", url, e)))?;
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| RpcError::Transport(format!("Failed to create HTTP client: {}", e)))?;

		let transport = Http::with_client(client, endpoint);
		let provider = RootProvider::new(RpcClient::new(transport, false));

		Ok(Self { provider, url })
	}

	/// The endpoint this client talks to.
	pub fn url(&self) -> &str {
		&self.url
	}
}

#[async_trait]
impl CallProvider for JsonRpcClient {
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
		debug!(%to, len = data.len(), "Sending eth_call");
		// Some nodes only read `data`, newer ones only `input`.
		let request = TransactionRequest::default()
			.to(to)
			.input(TransactionInput::both(data));

		let output = self
			.provider
			.call(request)
			.block(BlockId::latest())
			.await
			.map_err(map_transport_error)?;
		debug!(%to, len = output.len(), "Received eth_call result");
		Ok(output)
	}
}

fn map_transport_error(error: TransportError) -> RpcError {
	match error {
		TransportError::ErrorResp(payload) => RpcError::Rpc {
			code: payload.code,
			message: payload.message.to_string(),
		},
		TransportError::NullResp => {
			RpcError::InvalidResponse("response has no result".to_string())
		}
		TransportError::DeserError { err, .. } => {
			RpcError::InvalidResponse(format!("malformed response: {}", err))
		}
		TransportError::Transport(TransportErrorKind::HttpError(http)) => {
			RpcError::Status(http.status)
		}
		other => RpcError::Transport(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::rpc_reply;
	use alloy_primitives::address;
	use serde_json::json;
	use wiremock::matchers::{body_partial_json, method};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const TO: Address = address!("0xc689cA9BC4C0176b8a0d50d4733A44Af83834Ae8");

	async fn client_answering<R>(responder: R) -> (MockServer, JsonRpcClient)
	where
		R: wiremock::Respond + 'static,
	{
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_call", "params": [{"input": "0xabcd"}, "latest"]})))
			.respond_with(responder)
			.mount(&server)
			.await;
		let client = JsonRpcClient::new(server.uri(), Duration::from_secs(5)).unwrap();
		(server, client)
	}

	#[tokio::test]
	async fn test_eth_call_result() {
		let (_server, client) = client_answering(rpc_reply(json!({"result": "0x0102"}))).await;
		let out = client
			.call(TO, Bytes::from(vec![0xab, 0xcd]))
			.await
			.unwrap();
		assert_eq!(out, Bytes::from(vec![1, 2]));
	}

	#[tokio::test]
	async fn test_eth_call_error_object() {
		let (_server, client) = client_answering(rpc_reply(
			json!({"error": {"code": 3, "message": "execution reverted"}}),
		))
		.await;
		let err = client
			.call(TO, Bytes::from(vec![0xab, 0xcd]))
			.await
			.unwrap_err();
		assert!(matches!(err, RpcError::Rpc { code: 3, .. }));
	}

	#[tokio::test]
	async fn test_eth_call_http_status() {
		let (_server, client) = client_answering(ResponseTemplate::new(500)).await;
		let err = client
			.call(TO, Bytes::from(vec![0xab, 0xcd]))
			.await
			.unwrap_err();
		assert!(matches!(err, RpcError::Status(500)), "got {:?}", err);
	}

	#[tokio::test]
	async fn test_eth_call_malformed_responses() {
		let (_server, client) = client_answering(rpc_reply(json!({"result": "0xzz"}))).await;
		assert!(client
			.call(TO, Bytes::from(vec![0xab, 0xcd]))
			.await
			.is_err());

		let (_server, client) =
			client_answering(ResponseTemplate::new(200).set_body_string("not json")).await;
		assert!(client
			.call(TO, Bytes::from(vec![0xab, 0xcd]))
			.await
			.is_err());
	}

	#[test]
	fn test_rejects_invalid_url() {
		assert!(matches!(
			JsonRpcClient::new("not a url", Duration::from_secs(1)),
			Err(RpcError::Transport(_))
		));
	}
}
