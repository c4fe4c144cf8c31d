//! Configuration types. Every value defaults to the production deployment.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public read endpoint of the source chain.
pub const DEFAULT_RPC_URL: &str = "https://worldchain-mainnet.g.alchemy.com/public";
/// Source-chain composer contract.
pub const DEFAULT_COMPOSER: Address = address!("0xc689cA9BC4C0176b8a0d50d4733A44Af83834Ae8");
/// Messaging endpoint id of the destination chain.
pub const DEFAULT_DESTINATION_EID: u32 = 30184;
/// Destination contract for stableswap strategies.
pub const DEFAULT_STABLESWAP_TARGET: Address =
	address!("0xeb99024504f5e73Fc857E4B2a0CF076C7F91fa2E");
/// Destination contract for concentrated strategies.
pub const DEFAULT_CONCENTRATED_TARGET: Address =
	address!("0xDf12aaAdBaEc2C9cf9E56Bd4B807008530269839");
/// Virtual amount shipped for each asset.
pub const DEFAULT_VIRTUAL_AMOUNT: u64 = 2_000_000;
/// Local wallet connector bridge.
pub const DEFAULT_CONNECTOR_URL: &str = "http://127.0.0.1:8787";

/// Main configuration structure for the strategy shipper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipperConfig {
	pub network: NetworkConfig,
	pub destinations: DestinationsConfig,
	pub assets: AssetsConfig,
	pub relay: RelayConfig,
	pub submission: SubmissionConfig,
	pub connector: ConnectorConfig,
	/// Passed as-is to the storage factory.
	pub session: toml::Value,
	pub logging: LoggingConfig,
}

impl Default for ShipperConfig {
	fn default() -> Self {
		Self {
			network: NetworkConfig::default(),
			destinations: DestinationsConfig::default(),
			assets: AssetsConfig::default(),
			relay: RelayConfig::default(),
			submission: SubmissionConfig::default(),
			connector: ConnectorConfig::default(),
			session: toml::Value::Table(toml::Table::new()),
			logging: LoggingConfig::default(),
		}
	}
}

/// Source chain access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	pub rpc_url: String,
	pub composer: Address,
	pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			rpc_url: DEFAULT_RPC_URL.to_string(),
			composer: DEFAULT_COMPOSER,
			request_timeout_secs: 30,
		}
	}
}

impl NetworkConfig {
	/// Bound on each `eth_call`.
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}
}

/// Destination chain endpoint and the contract per strategy kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationsConfig {
	pub eid: u32,
	pub stableswap: Address,
	pub concentrated: Address,
}

impl Default for DestinationsConfig {
	fn default() -> Self {
		Self {
			eid: DEFAULT_DESTINATION_EID,
			stableswap: DEFAULT_STABLESWAP_TARGET,
			concentrated: DEFAULT_CONCENTRATED_TARGET,
		}
	}
}

/// The asset pair and the virtual amounts booked for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
	pub symbols: Vec<String>,
	pub amounts: Vec<u64>,
}

impl Default for AssetsConfig {
	fn default() -> Self {
		Self {
			symbols: vec!["USDC".to_string(), "USDT".to_string()],
			amounts: vec![DEFAULT_VIRTUAL_AMOUNT, DEFAULT_VIRTUAL_AMOUNT],
		}
	}
}

/// Execution budget requested from the relay on the destination chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
	pub receive_gas: u64,
	pub receive_value: u64,
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			receive_gas: 300_000,
			receive_value: 0,
		}
	}
}

/// Time bounds of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
	pub timeout_secs: u64,
	/// How long the CLI keeps watching a timed-out submission.
	pub late_result_grace_secs: u64,
}

impl Default for SubmissionConfig {
	fn default() -> Self {
		Self {
			timeout_secs: 60,
			late_result_grace_secs: 30,
		}
	}
}

impl SubmissionConfig {
	/// Bound on waiting for the wallet connector.
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// How long the CLI keeps waiting for a late answer after a timeout.
	pub fn late_result_grace(&self) -> Duration {
		Duration::from_secs(self.late_result_grace_secs)
	}
}

/// Wallet connector access and sign-in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
	pub url: String,
	/// Per-request HTTP bound. Longer than the submission timeout so a slow
	/// answer can still be recorded.
	pub request_timeout_secs: u64,
	pub auth_statement: String,
	pub auth_validity_secs: u64,
}

impl Default for ConnectorConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_CONNECTOR_URL.to_string(),
			request_timeout_secs: 300,
			auth_statement: "Sign to create a cross-chain liquidity strategy".to_string(),
			auth_validity_secs: 300,
		}
	}
}

impl ConnectorConfig {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	/// Validity window of a sign-in request.
	pub fn auth_validity(&self) -> Duration {
		Duration::from_secs(self.auth_validity_secs)
	}
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

/// Logging settings, overridable from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
		}
	}
}
