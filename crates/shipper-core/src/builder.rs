//! Wiring a [`StrategyShipper`] from configuration.
//!
//! Every collaborator can be injected; whatever is not injected is created
//! from the configuration.

use crate::shipper::{Destinations, StrategyShipper};
use crate::ShipError;
use shipper_account::{AccountInterface, MakerResolver};
use shipper_config::ShipperConfig;
use shipper_connector::{HttpWalletConnector, WalletConnector};
use shipper_delivery::{
	CallProvider, FeeQuoter, JsonRpcClient, RelayOptions, SubmissionLedger, TransactionSubmitter,
};
use shipper_storage::{SessionStore, StorageInterface, StorageService};
use shipper_strategy::{AssetPair, StrategyEncoder};
use shipper_types::{DestinationTarget, U256};
use std::sync::Arc;
use tracing::debug;

/// Builder for constructing a [`StrategyShipper`] from configuration.
///
/// Components not injected with a `with_*` method are created from the
/// configuration in [`ShipperBuilder::build`].
pub struct ShipperBuilder {
	config: ShipperConfig,
	connector: Option<Arc<dyn WalletConnector>>,
	call_provider: Option<Arc<dyn CallProvider>>,
	storage: Option<Box<dyn StorageInterface>>,
	account: Option<Arc<dyn AccountInterface>>,
	ledger: Option<SubmissionLedger>,
}

impl ShipperBuilder {
	/// Creates a builder for the given configuration.
	pub fn new(config: ShipperConfig) -> Self {
		Self {
			config,
			connector: None,
			call_provider: None,
			storage: None,
			account: None,
			ledger: None,
		}
	}

	/// Uses `connector` instead of the HTTP connector.
	pub fn with_connector(mut self, connector: Arc<dyn WalletConnector>) -> Self {
		self.connector = Some(connector);
		self
	}

	/// Uses `provider` instead of the JSON-RPC client.
	pub fn with_call_provider(mut self, provider: Arc<dyn CallProvider>) -> Self {
		self.call_provider = Some(provider);
		self
	}

	/// Session storage backend, used when no account is injected.
	pub fn with_storage(mut self, storage: Box<dyn StorageInterface>) -> Self {
		self.storage = Some(storage);
		self
	}

	/// Uses `account` instead of the session-backed resolver.
	pub fn with_account(mut self, account: Arc<dyn AccountInterface>) -> Self {
		self.account = Some(account);
		self
	}

	/// Records late results in `ledger`, shared with the caller.
	pub fn with_ledger(mut self, ledger: SubmissionLedger) -> Self {
		self.ledger = Some(ledger);
		self
	}

	/// Builds the shipper.
	///
	/// Fails with [`ShipError::Configuration`] when a component cannot be
	/// created, such as an unparseable RPC URL or an unknown storage backend.
	pub fn build(self) -> Result<StrategyShipper, ShipError> {
		let config = self.config;

		let connector: Arc<dyn WalletConnector> = match self.connector {
			Some(connector) => connector,
			None => Arc::new(
				HttpWalletConnector::new(&config.connector.url, config.connector.request_timeout())
					.map_err(|e| ShipError::Configuration(e.to_string()))?,
			),
		};

		let call_provider: Arc<dyn CallProvider> = match self.call_provider {
			Some(provider) => provider,
			None => Arc::new(
				JsonRpcClient::new(&config.network.rpc_url, config.network.request_timeout())
					.map_err(|e| ShipError::Configuration(e.to_string()))?,
			),
		};

		let account: Arc<dyn AccountInterface> = match self.account {
			Some(account) => account,
			None => {
				let backend = match self.storage {
					Some(storage) => storage,
					None => shipper_storage::create_storage(&config.session)
						.map_err(|e| ShipError::Configuration(e.to_string()))?,
				};
				let session = Arc::new(SessionStore::new(StorageService::new(backend)));
				Arc::new(
					MakerResolver::new(session, connector.clone())
						.with_statement(config.connector.auth_statement.clone())
						.with_validity(config.connector.auth_validity()),
				)
			}
		};

		let [symbol0, symbol1] = <[String; 2]>::try_from(config.assets.symbols.clone())
			.map_err(|_| {
				ShipError::Configuration("assets.symbols must name exactly two assets".to_string())
			})?;
		let [amount0, amount1] = <[u64; 2]>::try_from(config.assets.amounts.clone())
			.map_err(|_| {
				ShipError::Configuration("assets.amounts must hold exactly two amounts".to_string())
			})?;
		let encoder = StrategyEncoder::new(AssetPair::new(symbol0, symbol1));

		let destinations = Destinations {
			stableswap: DestinationTarget::new(
				config.destinations.eid,
				config.destinations.stableswap,
			),
			concentrated: DestinationTarget::new(
				config.destinations.eid,
				config.destinations.concentrated,
			),
		};

		let relay_options = RelayOptions::lz_receive(
			u128::from(config.relay.receive_gas),
			u128::from(config.relay.receive_value),
		)
		.encode();

		let mut submitter = TransactionSubmitter::new(connector, config.network.composer)
			.with_timeout(config.submission.timeout());
		if let Some(ledger) = self.ledger {
			submitter = submitter.with_ledger(ledger);
		}

		debug!(
			composer = %config.network.composer,
			stableswap = %destinations.stableswap,
			concentrated = %destinations.concentrated,
			"Built strategy shipper"
		);

		Ok(StrategyShipper::new(
			account,
			encoder,
			FeeQuoter::new(call_provider, config.network.composer),
			submitter,
			destinations,
			[U256::from(amount0), U256::from(amount1)],
			relay_options,
		))
	}
}
