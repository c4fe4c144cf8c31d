//! Configuration loading: file, substitution, overrides, validation.

use crate::{ConfigError, ShipperConfig};
use shipper_types::{Field, FieldType, Schema};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	/// Creates a loader with no file and the `SHIPPER_` environment prefix.
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "SHIPPER_".to_string(),
		}
	}

	/// Sets the configuration file to read.
	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	/// Sets the prefix of environment variable overrides.
	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads the configured file (defaults only if none was given), applies
	/// environment overrides and validates the result.
	pub async fn load(&self) -> Result<ShipperConfig, ConfigError> {
		let content = match &self.file_path {
			Some(path) => match tokio::fs::read_to_string(path).await {
				Ok(content) => content,
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
					return Err(ConfigError::FileNotFound(path.display().to_string()))
				}
				Err(e) => return Err(e.into()),
			},
			None => String::new(),
		};

		let mut config = self.parse(&content)?;
		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		debug!(
			file = ?self.file_path,
			rpc_url = %config.network.rpc_url,
			connector_url = %config.connector.url,
			"Loaded configuration"
		);
		Ok(config)
	}

	/// Substitutes `${VAR}` references, checks the raw tree against the
	/// schema, then deserializes.
	pub fn parse(&self, content: &str) -> Result<ShipperConfig, ConfigError> {
		let substituted = self.substitute_env_vars(content)?;

		let table = substituted
			.parse::<toml::Table>()
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;
		config_schema().validate(&toml::Value::Table(table))?;

		toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}")
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn env_override(&self, name: &str) -> Option<String> {
		env::var(format!("{}{}", self.env_prefix, name)).ok()
	}

	fn apply_env_overrides(&self, config: &mut ShipperConfig) -> Result<(), ConfigError> {
		if let Some(rpc_url) = self.env_override("RPC_URL") {
			config.network.rpc_url = rpc_url;
		}

		if let Some(connector_url) = self.env_override("CONNECTOR_URL") {
			config.connector.url = connector_url;
		}

		if let Some(timeout) = self.env_override("SUBMISSION_TIMEOUT_SECS") {
			config.submission.timeout_secs = timeout.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid submission timeout: {}", e))
			})?;
		}

		if let Some(log_level) = self.env_override("LOG_LEVEL") {
			config.logging.level = log_level;
		}

		Ok(())
	}
}

fn is_http_url(url: &str) -> bool {
	url.starts_with("http://") || url.starts_with("https://")
}

/// Semantic checks on the final configuration, after overrides.
pub fn validate_config(config: &ShipperConfig) -> Result<(), ConfigError> {
	if !is_http_url(&config.network.rpc_url) {
		return Err(ConfigError::ValidationError(format!(
			"network.rpc_url must be an http(s) URL, got '{}'",
			config.network.rpc_url
		)));
	}

	if !is_http_url(&config.connector.url) {
		return Err(ConfigError::ValidationError(format!(
			"connector.url must be an http(s) URL, got '{}'",
			config.connector.url
		)));
	}

	if config.submission.timeout_secs == 0 {
		return Err(ConfigError::ValidationError(
			"submission.timeout_secs must be greater than zero".to_string(),
		));
	}

	if config.network.composer.is_zero() {
		return Err(ConfigError::ValidationError(
			"network.composer must not be the zero address".to_string(),
		));
	}

	if config.destinations.stableswap.is_zero() || config.destinations.concentrated.is_zero() {
		return Err(ConfigError::ValidationError(
			"destination contracts must not be the zero address".to_string(),
		));
	}

	let symbols = &config.assets.symbols;
	if symbols.len() != 2 || symbols.iter().any(|s| s.trim().is_empty()) {
		return Err(ConfigError::ValidationError(
			"assets.symbols must name exactly two assets".to_string(),
		));
	}
	if symbols[0] == symbols[1] {
		return Err(ConfigError::ValidationError(format!(
			"assets.symbols must be distinct, got '{}' twice",
			symbols[0]
		)));
	}

	if config.assets.amounts.len() != 2 {
		return Err(ConfigError::ValidationError(
			"assets.amounts must hold exactly two amounts".to_string(),
		));
	}

	if config.relay.receive_gas == 0 {
		return Err(ConfigError::ValidationError(
			"relay.receive_gas must be greater than zero".to_string(),
		));
	}

	Ok(())
}

fn one_of(allowed: &'static [&'static str]) -> impl Fn(&toml::Value) -> Result<(), String> {
	move |value| match value.as_str() {
		Some(s) if allowed.contains(&s) => Ok(()),
		_ => Err(format!("must be one of {:?}", allowed)),
	}
}

fn positive(name: &str) -> Field {
	Field::new(
		name,
		FieldType::Integer {
			min: Some(1),
			max: None,
		},
	)
}

fn non_negative(name: &str) -> Field {
	Field::new(
		name,
		FieldType::Integer {
			min: Some(0),
			max: None,
		},
	)
}

fn section(name: &str, optional: Vec<Field>) -> Field {
	Field::new(name, FieldType::Table(Schema::new(vec![], optional)))
}

/// Shape of the configuration file. All sections and fields are optional.
pub fn config_schema() -> Schema {
	Schema::new(
		vec![],
		vec![
			section(
				"network",
				vec![
					Field::new("rpc_url", FieldType::Url),
					Field::new("composer", FieldType::Address),
					positive("request_timeout_secs"),
				],
			),
			section(
				"destinations",
				vec![
					Field::new(
						"eid",
						FieldType::Integer {
							min: Some(1),
							max: Some(u32::MAX as i64),
						},
					),
					Field::new("stableswap", FieldType::Address),
					Field::new("concentrated", FieldType::Address),
				],
			),
			section(
				"assets",
				vec![
					Field::new(
						"symbols",
						FieldType::Array {
							item: Box::new(FieldType::String),
							len: Some(2),
						},
					),
					Field::new(
						"amounts",
						FieldType::Array {
							item: Box::new(FieldType::Integer {
								min: Some(0),
								max: None,
							}),
							len: Some(2),
						},
					),
				],
			),
			section(
				"relay",
				vec![positive("receive_gas"), non_negative("receive_value")],
			),
			section(
				"submission",
				vec![positive("timeout_secs"), non_negative("late_result_grace_secs")],
			),
			section(
				"connector",
				vec![
					Field::new("url", FieldType::Url),
					positive("request_timeout_secs"),
					Field::new("auth_statement", FieldType::String),
					positive("auth_validity_secs"),
				],
			),
			section(
				"session",
				vec![
					Field::new("backend", FieldType::String)
						.with_validator(one_of(&["file", "memory"])),
					Field::new("storage_path", FieldType::String),
				],
			),
			section(
				"logging",
				vec![
					Field::new("level", FieldType::String),
					Field::new("format", FieldType::String)
						.with_validator(one_of(&["pretty", "json"])),
				],
			),
		],
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{LogFormat, DEFAULT_COMPOSER, DEFAULT_DESTINATION_EID};
	use alloy_primitives::address;
	use std::io::Write;

	#[tokio::test]
	async fn test_defaults_without_file() {
		let config = ConfigLoader::new()
			.with_env_prefix("SHIPPER_TEST_DEFAULTS_")
			.load()
			.await
			.unwrap();
		assert_eq!(config, ShipperConfig::default());
		assert_eq!(config.destinations.eid, DEFAULT_DESTINATION_EID);
		assert_eq!(config.network.composer, DEFAULT_COMPOSER);
		assert_eq!(config.assets.amounts, vec![2_000_000, 2_000_000]);
		assert_eq!(config.submission.timeout_secs, 60);
	}

	#[tokio::test]
	async fn test_load_file_with_substitution() {
		env::set_var("SHIPPER_TEST_CONNECTOR_HOST", "wallet.local:9000");
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[network]
rpc_url = "https://rpc.example.org"

[destinations]
eid = 40245
stableswap = "0x00000000000000000000000000000000000000b1"

[connector]
url = "http://${{SHIPPER_TEST_CONNECTOR_HOST}}"

[session]
backend = "memory"

[logging]
format = "json"
"#
		)
		.unwrap();

		let config = ConfigLoader::new()
			.with_file(file.path())
			.with_env_prefix("SHIPPER_TEST_FILE_")
			.load()
			.await
			.unwrap();
		assert_eq!(config.network.rpc_url, "https://rpc.example.org");
		assert_eq!(config.destinations.eid, 40245);
		assert_eq!(
			config.destinations.stableswap,
			address!("0x00000000000000000000000000000000000000b1")
		);
		// untouched fields keep their defaults
		assert_eq!(
			config.destinations.concentrated,
			crate::DEFAULT_CONCENTRATED_TARGET
		);
		assert_eq!(config.connector.url, "http://wallet.local:9000");
		assert_eq!(
			config.session.get("backend").and_then(|v| v.as_str()),
			Some("memory")
		);
		assert_eq!(config.logging.format, LogFormat::Json);
	}

	#[tokio::test]
	async fn test_missing_file() {
		let result = ConfigLoader::new()
			.with_file("/nonexistent/shipper.toml")
			.load()
			.await;
		assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
	}

	#[test]
	fn test_missing_env_var() {
		let result = ConfigLoader::new().parse("[connector]\nurl = \"${SHIPPER_TEST_UNSET_VAR}\"\n");
		assert!(
			matches!(result, Err(ConfigError::EnvVarNotFound(ref v)) if v == "SHIPPER_TEST_UNSET_VAR")
		);
	}

	#[test]
	fn test_schema_reports_field_path() {
		let err = ConfigLoader::new()
			.parse("[destinations]\nstableswap = \"0x1234\"\n")
			.unwrap_err();
		assert!(err.to_string().contains("destinations.stableswap"));

		let err = ConfigLoader::new()
			.parse("[assets]\nsymbols = [\"USDC\"]\n")
			.unwrap_err();
		assert!(err.to_string().contains("assets.symbols"));

		let err = ConfigLoader::new()
			.parse("[session]\nbackend = \"redis\"\n")
			.unwrap_err();
		assert!(err.to_string().contains("session.backend"));

		let err = ConfigLoader::new()
			.parse("[network]\nrpc_url = \"ws://localhost\"\n")
			.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	async fn test_env_overrides() {
		env::set_var("SHIPPER_TEST_OVR_RPC_URL", "http://localhost:8545");
		env::set_var("SHIPPER_TEST_OVR_SUBMISSION_TIMEOUT_SECS", "5");
		env::set_var("SHIPPER_TEST_OVR_LOG_LEVEL", "debug");

		let config = ConfigLoader::new()
			.with_env_prefix("SHIPPER_TEST_OVR_")
			.load()
			.await
			.unwrap();
		assert_eq!(config.network.rpc_url, "http://localhost:8545");
		assert_eq!(config.submission.timeout_secs, 5);
		assert_eq!(config.logging.level, "debug");
	}

	#[tokio::test]
	async fn test_invalid_overrides_rejected() {
		env::set_var("SHIPPER_TEST_BAD_SUBMISSION_TIMEOUT_SECS", "0");
		let result = ConfigLoader::new()
			.with_env_prefix("SHIPPER_TEST_BAD_")
			.load()
			.await;
		assert!(matches!(result, Err(ConfigError::ValidationError(_))));

		env::set_var("SHIPPER_TEST_NAN_SUBMISSION_TIMEOUT_SECS", "soon");
		let result = ConfigLoader::new()
			.with_env_prefix("SHIPPER_TEST_NAN_")
			.load()
			.await;
		assert!(matches!(result, Err(ConfigError::ValidationError(_))));
	}

	#[test]
	fn test_duplicate_symbols_rejected() {
		let mut config = ShipperConfig::default();
		config.assets.symbols = vec!["USDC".to_string(), "USDC".to_string()];
		assert!(validate_config(&config).is_err());
	}

	#[test]
	fn test_sample_config_matches_defaults() {
		let loader = ConfigLoader::new().with_env_prefix("SHIPPER_TEST_SAMPLE_");
		let config = loader
			.parse(include_str!("../../../config/shipper.toml"))
			.unwrap();
		validate_config(&config).unwrap();

		let defaults = ShipperConfig::default();
		assert_eq!(config.network, defaults.network);
		assert_eq!(config.destinations, defaults.destinations);
		assert_eq!(config.assets, defaults.assets);
		assert_eq!(config.submission, defaults.submission);
		assert_eq!(config.connector, defaults.connector);
		assert_eq!(config.session["backend"].as_str(), Some("file"));
	}
}
