//! Account resolution for the strategy shipper.
//!
//! The maker of a strategy is the user's wallet address. It is read from the
//! session record when the verification flow already stored it, and obtained
//! through an interactive wallet sign-in otherwise.

use async_trait::async_trait;
use shipper_types::Address;
use thiserror::Error;

pub mod resolver;

pub use resolver::{MakerResolver, DEFAULT_AUTH_STATEMENT, DEFAULT_AUTH_VALIDITY};

/// Errors that can occur while resolving the maker address.
#[derive(Debug, Error)]
pub enum AccountError {
	/// No address could be obtained; the user has to sign in again.
	#[error("Not authenticated: {0}")]
	NotAuthenticated(String),
}

/// Trait for anything that can tell who is submitting.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	async fn address(&self) -> Result<Address, AccountError>;
}
