//! Relay options attached to a cross-chain message.
//!
//! Type-3 options: a `0x0003` header followed by worker options. Only the
//! executor's `lzReceive` option is produced here:
//! `worker_id(1) | option_len(u16) | option_type(1) | gas(u128) [| value(u128)]`,
//! where the value is omitted when it is zero.

use alloy_primitives::Bytes;

/// Gas the executor allots to the destination `lzReceive` call.
pub const DEFAULT_RECEIVE_GAS: u128 = 300_000;

const OPTIONS_TYPE_3: u16 = 3;
const EXECUTOR_WORKER_ID: u8 = 1;
const OPTION_TYPE_LZ_RECEIVE: u8 = 1;

/// Executor options attached to every shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
	pub receive_gas: u128,
	pub receive_value: u128,
}

impl RelayOptions {
	/// Options granting `receive_gas` and dropping `receive_value` wei on delivery.
	pub fn lz_receive(receive_gas: u128, receive_value: u128) -> Self {
		Self {
			receive_gas,
			receive_value,
		}
	}

	/// Encodes the options in the type-3 layout:
	/// `0x0003 | worker id | option length | option type | gas [| value]`.
	///
	/// The value is only present when it is non-zero.
	pub fn encode(&self) -> Bytes {
		let mut option = Vec::with_capacity(33);
		option.push(OPTION_TYPE_LZ_RECEIVE);
		option.extend_from_slice(&self.receive_gas.to_be_bytes());
		if self.receive_value > 0 {
			option.extend_from_slice(&self.receive_value.to_be_bytes());
		}

		let mut out = Vec::with_capacity(2 + 3 + option.len());
		out.extend_from_slice(&OPTIONS_TYPE_3.to_be_bytes());
		out.push(EXECUTOR_WORKER_ID);
		out.extend_from_slice(&(option.len() as u16).to_be_bytes());
		out.extend_from_slice(&option);
		Bytes::from(out)
	}
}

impl Default for RelayOptions {
	fn default() -> Self {
		Self::lz_receive(DEFAULT_RECEIVE_GAS, 0)
	}
}
