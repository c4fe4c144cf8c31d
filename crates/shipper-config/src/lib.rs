//! Configuration for the strategy shipper.
//!
//! Configuration is a TOML file with `${VAR}` environment substitution,
//! overridable through `SHIPPER_`-prefixed environment variables. Every
//! setting has a default matching the production deployment, so an empty
//! file (or no file at all) is a valid configuration.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

impl From<shipper_types::ValidationError> for ConfigError {
	fn from(err: shipper_types::ValidationError) -> Self {
		ConfigError::ValidationError(err.to_string())
	}
}
