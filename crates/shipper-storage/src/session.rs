//! The persisted session record.
//!
//! The identity verification flow writes this record; the shipper only reads
//! it and, after an interactive wallet handshake, merges the resolved wallet
//! address back in. Fields the shipper does not know about are preserved.

use crate::{StorageError, StorageService};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

const SESSION_NAMESPACE: &str = "session";
const AUTH_RECORD_ID: &str = "auth";
const WALLET_ADDRESS_FIELD: &str = "wallet_address";

/// Authentication record left behind by the verification flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
	#[serde(default)]
	pub verified: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub wallet_address: Option<String>,
	/// Everything else the verification flow stored.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Reads and updates the session record.
pub struct SessionStore {
	storage: StorageService,
	write_lock: Mutex<()>,
}

impl SessionStore {
	/// Creates a session store over `storage`.
	pub fn new(storage: StorageService) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	/// Loads the record, `None` if nothing has been stored yet.
	pub async fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
		self.storage
			.retrieve_optional(SESSION_NAMESPACE, AUTH_RECORD_ID)
			.await
	}

	/// Stored wallet address, if the record exists and carries a non-empty one.
	pub async fn wallet_address(&self) -> Result<Option<String>, StorageError> {
		Ok(self
			.load()
			.await?
			.and_then(|record| record.wallet_address)
			.filter(|address| !address.trim().is_empty()))
	}

	/// Merges `wallet_address` into the record, creating it if absent.
	///
	/// Only the `wallet_address` field is written; all other fields are kept
	/// exactly as stored.
	pub async fn remember_wallet_address(&self, address: &str) -> Result<(), StorageError> {
		let _guard = self.write_lock.lock().await;

		let mut fields = match self
			.storage
			.retrieve_optional::<Value>(SESSION_NAMESPACE, AUTH_RECORD_ID)
			.await?
		{
			Some(Value::Object(fields)) => fields,
			Some(other) => {
				return Err(StorageError::Serialization(format!(
					"session record is not an object: {}",
					other
				)))
			}
			None => Map::new(),
		};

		fields.insert(
			WALLET_ADDRESS_FIELD.to_string(),
			Value::String(address.to_string()),
		);

		self.storage
			.store(SESSION_NAMESPACE, AUTH_RECORD_ID, &Value::Object(fields))
			.await?;
		debug!(wallet_address = %address, "Stored wallet address in session record");
		Ok(())
	}

	/// Replaces the whole record. Used by the verification flow and in tests.
	pub async fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
		let _guard = self.write_lock.lock().await;
		self.storage
			.store(SESSION_NAMESPACE, AUTH_RECORD_ID, record)
			.await
	}

	/// Deletes the session record, forcing a new sign-in.
	pub async fn clear(&self) -> Result<(), StorageError> {
		let _guard = self.write_lock.lock().await;
		self.storage.remove(SESSION_NAMESPACE, AUTH_RECORD_ID).await
	}
}
