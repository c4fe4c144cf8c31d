//! Shared types for the strategy shipper.
//!
//! This crate holds the data model that flows through every pipeline stage:
//! strategy requests, canonical asset identifiers, destination targets, fee
//! quotes and submission outcomes, together with the Solidity definitions of
//! the composer contract and the configuration schema validator.

pub mod abi;
pub mod delivery;
pub mod strategy;
pub mod validation;

pub use delivery::*;
pub use strategy::*;
pub use validation::*;

pub use alloy_primitives::{Address, Bytes, B256, U256};
