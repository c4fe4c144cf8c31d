//! Core pipeline of the strategy shipper.
//!
//! A ship action runs four stages in order and stops at the first failure:
//! the maker address is resolved, the strategy is encoded, the relay fee is
//! quoted and padded, and the value-bearing transaction is submitted through
//! the wallet connector. Nothing reaches the chain unless the last stage
//! succeeds.

pub mod builder;
pub mod error;
pub mod shipper;

pub use builder::ShipperBuilder;
pub use error::ShipError;
pub use shipper::{Destinations, PreparedShipment, ShipReceipt, StrategyShipper};
