use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use shipper_config::{ConfigLoader, ShipperConfig};
use shipper_core::{ShipError, ShipperBuilder, StrategyShipper};
use shipper_delivery::LateStatus;
use shipper_strategy::{AssetPair, StrategyEncoder};
use shipper_types::SubmissionOutcome;
use tracing::{info, warn};

mod cli;
mod logging;

use cli::{Cli, Command, StrategyArgs};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let mut loader = ConfigLoader::new();
	if let Some(path) = &cli.config {
		loader = loader.with_file(path);
	}
	let config = loader.load().await.context("Failed to load configuration")?;

	let level = cli
		.log_level
		.clone()
		.unwrap_or_else(|| config.logging.level.clone());
	let format = cli
		.log_format
		.map(Into::into)
		.unwrap_or(config.logging.format);
	logging::setup_tracing(&level, format)?;

	match cli.command {
		Command::Ship { strategy, json } => ship(config, &strategy, json).await,
		Command::Quote { strategy } => quote(config, &strategy).await,
		Command::Encode { maker, strategy } => encode(&config, maker, &strategy),
		Command::Validate => validate(&cli, &config),
	}
}

fn build_shipper(config: ShipperConfig) -> Result<StrategyShipper> {
	ShipperBuilder::new(config)
		.build()
		.context("Failed to build strategy shipper")
}

async fn ship(config: ShipperConfig, args: &StrategyArgs, json: bool) -> Result<()> {
	let grace = config.submission.late_result_grace();
	let shipper = build_shipper(config)?;
	let request = args.to_request();

	match shipper.ship(&request).await {
		Ok(receipt) => {
			if json {
				println!("{}", serde_json::to_string_pretty(&receipt)?);
			} else {
				println!("Strategy shipped");
				println!("  transaction id: {}", receipt.transaction_id);
				println!("  kind:           {}", receipt.kind);
				println!("  destination:    {}", receipt.target);
				println!("  maker:          {}", receipt.maker);
				println!("  quoted fee:     {} wei", receipt.quote.native_fee);
				println!("  value sent:     {} wei", receipt.value_sent);
			}
			Ok(())
		}
		Err(ShipError::TimedOut {
			submission_id,
			after,
		}) => {
			warn!(
				%submission_id,
				after_secs = after.as_secs(),
				grace_secs = grace.as_secs(),
				"Submission timed out, waiting for a late answer"
			);
			match shipper.ledger().wait_for(&submission_id, grace).await {
				Some(LateStatus::Resolved(SubmissionOutcome::Success { transaction_id })) => {
					println!("Strategy shipped after the timeout");
					println!("  transaction id: {}", transaction_id);
					Ok(())
				}
				Some(LateStatus::Resolved(outcome)) => {
					bail!("Submission {} finished late: {}", submission_id, outcome)
				}
				_ => bail!(
					"Submission {} is still pending after {}s; check the wallet before trying again",
					submission_id,
					(after + grace).as_secs()
				),
			}
		}
		Err(e) => {
			if e.is_retryable() {
				warn!("The action can be retried");
			}
			Err(e).context("Failed to ship strategy")
		}
	}
}

async fn quote(config: ShipperConfig, args: &StrategyArgs) -> Result<()> {
	let shipper = build_shipper(config)?;
	let prepared = shipper
		.prepare(&args.to_request())
		.await
		.context("Failed to quote strategy")?;

	println!("maker:          {}", prepared.maker);
	println!("destination:    {}", prepared.shipment.target);
	println!("strategy:       {}", prepared.shipment.strategy);
	println!("native fee:     {} wei", prepared.quote.native_fee);
	println!("value to send:  {} wei", prepared.value_to_send());
	Ok(())
}

fn encode(
	config: &ShipperConfig,
	maker: shipper_types::Address,
	args: &StrategyArgs,
) -> Result<()> {
	let [symbol0, symbol1] = <[String; 2]>::try_from(config.assets.symbols.clone())
		.map_err(|_| anyhow!("assets.symbols must name exactly two assets"))?;
	let encoder = StrategyEncoder::new(AssetPair::new(symbol0, symbol1));

	let encoded = encoder
		.encode(maker, &args.to_request())
		.context("Failed to encode strategy")?;
	println!("{}", encoded);
	Ok(())
}

fn validate(cli: &Cli, config: &ShipperConfig) -> Result<()> {
	match &cli.config {
		Some(path) => info!("Configuration file {:?} is valid", path),
		None => info!("No configuration file given, defaults are valid"),
	}
	info!("RPC endpoint: {}", config.network.rpc_url);
	info!("Composer: {}", config.network.composer);
	info!(
		"Destinations (eid {}): stableswap {}, concentrated {}",
		config.destinations.eid, config.destinations.stableswap, config.destinations.concentrated
	);
	info!(
		"Assets: {} / {}",
		config.assets.symbols.join(", "),
		config
			.assets
			.amounts
			.iter()
			.map(|a| a.to_string())
			.collect::<Vec<_>>()
			.join(", ")
	);
	info!("Wallet connector: {}", config.connector.url);
	info!(
		"Submission timeout: {}s",
		config.submission.timeout_secs
	);
	Ok(())
}
