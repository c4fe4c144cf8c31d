//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use shipper_config::LogFormat;
use shipper_types::{Address, StrategyRequest};
use std::path::PathBuf;

/// Command-line arguments of the `strategy-shipper` binary.
#[derive(Parser, Debug)]
#[command(name = "strategy-shipper")]
#[command(about = "Ship liquidity strategies to their destination chain", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", env = "SHIPPER_CONFIG")]
	pub config: Option<PathBuf>,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "SHIPPER_LOG_LEVEL")]
	pub log_level: Option<String>,

	/// Log output format override
	#[arg(long, value_enum)]
	pub log_format: Option<LogFormatArg>,

	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Resolve, encode, quote and submit a strategy
	Ship {
		#[command(flatten)]
		strategy: StrategyArgs,

		/// Print the receipt as JSON
		#[arg(long)]
		json: bool,
	},

	/// Resolve, encode and quote a strategy without submitting it
	Quote {
		#[command(flatten)]
		strategy: StrategyArgs,
	},

	/// Print the encoded strategy for a given maker
	Encode {
		/// Maker address to encode the strategy for
		#[arg(long)]
		maker: Address,

		#[command(flatten)]
		strategy: StrategyArgs,
	},

	/// Validate the configuration file
	Validate,
}

/// Strategy kinds accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyType {
	Stableswap,
	Concentrated,
}

/// Log formats accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
	Pretty,
	Json,
}

impl From<LogFormatArg> for LogFormat {
	fn from(arg: LogFormatArg) -> Self {
		match arg {
			LogFormatArg::Pretty => LogFormat::Pretty,
			LogFormatArg::Json => LogFormat::Json,
		}
	}
}

/// Strategy parameters shared by the subcommands.
#[derive(Args, Debug, Clone)]
pub struct StrategyArgs {
	/// Strategy type
	#[arg(long = "type", value_enum)]
	pub strategy_type: StrategyType,

	/// Pool fee in basis points
	#[arg(long, allow_negative_numbers = true)]
	pub fee_bps: i64,

	/// Stableswap amplification factor (default 100)
	#[arg(long, allow_negative_numbers = true)]
	pub amplification_factor: Option<i64>,

	/// Concentrated lower price, 18-decimal fixed point (decimal or 0x-hex)
	#[arg(long)]
	pub price_lower: Option<String>,

	/// Concentrated upper price, 18-decimal fixed point (decimal or 0x-hex)
	#[arg(long)]
	pub price_upper: Option<String>,
}

impl StrategyArgs {
	/// Converts the arguments into a request; validation happens in the encoder.
	pub fn to_request(&self) -> StrategyRequest {
		match self.strategy_type {
			StrategyType::Stableswap => StrategyRequest::Stableswap {
				fee_bps: self.fee_bps,
				amplification_factor: self.amplification_factor,
			},
			StrategyType::Concentrated => StrategyRequest::Concentrated {
				fee_bps: self.fee_bps,
				price_lower: self.price_lower.clone(),
				price_upper: self.price_upper.clone(),
			},
		}
	}
}
