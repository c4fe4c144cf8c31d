//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use shipper_config::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn setup_tracing(level: &str, format: LogFormat) -> Result<()> {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	let subscriber = tracing_subscriber::registry().with(env_filter);

	match format {
		LogFormat::Json => subscriber
			.with(tracing_subscriber::fmt::layer().json().with_target(false))
			.try_init(),
		LogFormat::Pretty => subscriber
			.with(tracing_subscriber::fmt::layer().with_target(false))
			.try_init(),
	}
	.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
}
