//! Maker address resolution.

use crate::{AccountError, AccountInterface};
use async_trait::async_trait;
use chrono::Utc;
use shipper_connector::{WalletAuthRequest, WalletConnector};
use shipper_storage::SessionStore;
use shipper_types::Address;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Statement shown in the wallet sign-in prompt.
pub const DEFAULT_AUTH_STATEMENT: &str = "Sign to create a cross-chain liquidity strategy";

/// How long a sign-in request stays valid.
pub const DEFAULT_AUTH_VALIDITY: Duration = Duration::from_secs(5 * 60);

/// Resolves the maker from the session record, falling back to a wallet
/// sign-in whose result is written back to the record.
pub struct MakerResolver {
	session: Arc<SessionStore>,
	connector: Arc<dyn WalletConnector>,
	statement: String,
	validity: Duration,
}

impl MakerResolver {
	/// Creates a resolver with the default sign-in statement and validity window.
	pub fn new(session: Arc<SessionStore>, connector: Arc<dyn WalletConnector>) -> Self {
		Self {
			session,
			connector,
			statement: DEFAULT_AUTH_STATEMENT.to_string(),
			validity: DEFAULT_AUTH_VALIDITY,
		}
	}

	/// Sets the statement the wallet shows when asking for a signature.
	pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
		self.statement = statement.into();
		self
	}

	/// Sets how long a sign-in request stays valid.
	pub fn with_validity(mut self, validity: Duration) -> Self {
		self.validity = validity;
		self
	}

	/// Returns the maker address, running the sign-in at most once.
	pub async fn resolve_maker(&self) -> Result<Address, AccountError> {
		if let Some(address) = self.stored_address().await {
			debug!(maker = %address, "Using wallet address from session");
			return Ok(address);
		}

		info!("No wallet address in session, requesting wallet sign-in");
		let address = self.sign_in().await?;

		if let Err(e) = self
			.session
			.remember_wallet_address(&address.to_checksum(None))
			.await
		{
			warn!(error = %e, "Failed to store wallet address in session");
		}

		info!(maker = %address, "Resolved maker through wallet sign-in");
		Ok(address)
	}

	/// Stored address, if present and well-formed. Read failures and
	/// malformed values fall through to the sign-in.
	async fn stored_address(&self) -> Option<Address> {
		let raw = match self.session.wallet_address().await {
			Ok(raw) => raw?,
			Err(e) => {
				warn!(error = %e, "Failed to read session record");
				return None;
			}
		};

		match raw.trim().parse::<Address>() {
			Ok(address) => Some(address),
			Err(e) => {
				warn!(wallet_address = %raw, error = %e, "Ignoring malformed stored wallet address");
				None
			}
		}
	}

	async fn sign_in(&self) -> Result<Address, AccountError> {
		let now = Utc::now();
		let validity = chrono::Duration::from_std(self.validity)
			.map_err(|e| AccountError::NotAuthenticated(format!("invalid validity: {}", e)))?;
		let request = WalletAuthRequest {
			nonce: Uuid::new_v4().simple().to_string(),
			request_id: Uuid::new_v4().to_string(),
			expiration_time: now + validity,
			not_before: now,
			statement: self.statement.clone(),
		};
		debug!(request_id = %request.request_id, "Sending wallet sign-in request");

		let payload = self
			.connector
			.wallet_auth(request)
			.await
			.map_err(|e| AccountError::NotAuthenticated(format!("wallet sign-in failed: {}", e)))?;

		if !payload.is_success() {
			return Err(AccountError::NotAuthenticated(format!(
				"wallet sign-in returned status '{}' ({})",
				payload.status,
				payload.error_code.as_deref().unwrap_or("no error code")
			)));
		}

		let raw = payload.address.ok_or_else(|| {
			AccountError::NotAuthenticated("wallet sign-in returned no address".to_string())
		})?;
		raw.trim().parse::<Address>().map_err(|e| {
			AccountError::NotAuthenticated(format!("wallet returned invalid address '{}': {}", raw, e))
		})
	}
}

#[async_trait]
impl AccountInterface for MakerResolver {
	async fn address(&self) -> Result<Address, AccountError> {
		self.resolve_maker().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use shipper_connector::{
		ConnectorError, SendTransactionPayload, SendTransactionRequest, WalletAuthPayload,
	};
	use shipper_storage::implementations::memory::MemoryStorage;
	use shipper_storage::{SessionRecord, StorageInterface, StorageService};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	const MAKER: &str = "0x00000000000000000000000000000000000000Aa";

	/// Connector fake that answers every sign-in with a fixed payload.
	struct FakeConnector {
		auth: Result<WalletAuthPayload, String>,
		calls: AtomicUsize,
		last_request: Mutex<Option<WalletAuthRequest>>,
	}

	impl FakeConnector {
		fn answering(auth: Result<WalletAuthPayload, String>) -> Arc<Self> {
			Arc::new(Self {
				auth,
				calls: AtomicUsize::new(0),
				last_request: Mutex::new(None),
			})
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl WalletConnector for FakeConnector {
		async fn wallet_auth(
			&self,
			request: WalletAuthRequest,
		) -> Result<WalletAuthPayload, ConnectorError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			*self.last_request.lock().unwrap() = Some(request);
			self.auth.clone().map_err(ConnectorError::Transport)
		}

		async fn send_transaction(
			&self,
			_request: SendTransactionRequest,
		) -> Result<Option<SendTransactionPayload>, ConnectorError> {
			unreachable!("resolver never sends transactions")
		}
	}

	fn success() -> Result<WalletAuthPayload, String> {
		Ok(WalletAuthPayload {
			status: "success".to_string(),
			address: Some(MAKER.to_string()),
			error_code: None,
		})
	}

	fn session(backend: &MemoryStorage) -> Arc<SessionStore> {
		Arc::new(SessionStore::new(StorageService::new(Box::new(
			backend.clone(),
		))))
	}

	#[tokio::test]
	async fn test_stored_address_skips_sign_in() {
		let backend = MemoryStorage::new();
		let store = session(&backend);
		store
			.save(&SessionRecord {
				verified: true,
				wallet_address: Some(MAKER.to_string()),
				extra: Default::default(),
			})
			.await
			.unwrap();
		let connector = FakeConnector::answering(Err("should not be called".to_string()));

		let resolver = MakerResolver::new(store, connector.clone());
		let maker = resolver.resolve_maker().await.unwrap();

		assert_eq!(maker, MAKER.parse::<Address>().unwrap());
		assert_eq!(connector.calls(), 0);
	}

	#[tokio::test]
	async fn test_sign_in_once_and_store() {
		let backend = MemoryStorage::new();
		backend
			.set_bytes(
				"session:auth",
				serde_json::to_vec(&json!({"verified": true, "nullifier_hash": "0x1"})).unwrap(),
			)
			.await
			.unwrap();
		let store = session(&backend);
		let connector = FakeConnector::answering(success());
		let resolver = MakerResolver::new(store.clone(), connector.clone());

		let maker = resolver.resolve_maker().await.unwrap();
		assert_eq!(maker, MAKER.parse::<Address>().unwrap());
		assert_eq!(connector.calls(), 1);

		let record = store.load().await.unwrap().unwrap();
		assert!(record.verified);
		assert_eq!(record.extra.get("nullifier_hash"), Some(&json!("0x1")));
		assert_eq!(
			record.wallet_address.unwrap().parse::<Address>().unwrap(),
			maker
		);

		// second resolution is served from the session
		resolver.resolve_maker().await.unwrap();
		assert_eq!(connector.calls(), 1);
	}

	#[tokio::test]
	async fn test_sign_in_request_window() {
		let connector = FakeConnector::answering(success());
		let resolver = MakerResolver::new(session(&MemoryStorage::new()), connector.clone());
		resolver.resolve_maker().await.unwrap();

		let request = connector.last_request.lock().unwrap().clone().unwrap();
		assert_eq!(request.statement, DEFAULT_AUTH_STATEMENT);
		assert_eq!(
			request.expiration_time - request.not_before,
			chrono::Duration::minutes(5)
		);
		assert!(!request.nonce.is_empty());
		assert_ne!(request.nonce, request.request_id);
	}

	#[tokio::test]
	async fn test_malformed_stored_address_falls_back() {
		let backend = MemoryStorage::new();
		let store = session(&backend);
		store.remember_wallet_address("not-an-address").await.unwrap();
		let connector = FakeConnector::answering(success());

		let maker = MakerResolver::new(store, connector.clone())
			.resolve_maker()
			.await
			.unwrap();
		assert_eq!(maker, MAKER.parse::<Address>().unwrap());
		assert_eq!(connector.calls(), 1);
	}

	#[tokio::test]
	async fn test_rejected_sign_in() {
		let connector = FakeConnector::answering(Ok(WalletAuthPayload {
			status: "error".to_string(),
			address: None,
			error_code: Some("user_rejected".to_string()),
		}));
		let backend = MemoryStorage::new();
		let resolver = MakerResolver::new(session(&backend), connector);

		let err = resolver.resolve_maker().await.unwrap_err();
		assert!(matches!(err, AccountError::NotAuthenticated(ref m) if m.contains("user_rejected")));
		assert!(backend.is_empty());
	}

	#[tokio::test]
	async fn test_connector_failure_and_bad_address() {
		let resolver = MakerResolver::new(
			session(&MemoryStorage::new()),
			FakeConnector::answering(Err("connection refused".to_string())),
		);
		assert!(matches!(
			resolver.resolve_maker().await,
			Err(AccountError::NotAuthenticated(_))
		));

		let resolver = MakerResolver::new(
			session(&MemoryStorage::new()),
			FakeConnector::answering(Ok(WalletAuthPayload {
				status: "success".to_string(),
				address: Some("0x1234".to_string()),
				error_code: None,
			})),
		);
		assert!(matches!(
			resolver.resolve_maker().await,
			Err(AccountError::NotAuthenticated(_))
		));
	}
}
