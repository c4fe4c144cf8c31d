//! Strategy encoder.
//!
//! Validates a [`StrategyRequest`] and serializes it with the canonical ABI
//! tuple layout, one layout per strategy kind:
//!
//! - stableswap: `(address maker, bytes32 token0Id, bytes32 token1Id, uint256 feeBps, uint256 amplificationFactor, bytes32 salt)`
//! - concentrated: `(address maker, bytes32 token0Id, bytes32 token1Id, uint256 feeBps, uint256 priceLower, uint256 priceUpper, bytes32 salt)`

use crate::{registry::AssetPair, EncodingError};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolType;
use shipper_types::abi::{ConcentratedStrategy, StableswapStrategy};
use shipper_types::{
	CanonicalAssetId, EncodedStrategy, StrategyDescriptor, StrategyKind, StrategyParameters,
	StrategyRequest, DEFAULT_AMPLIFICATION_FACTOR, DEFAULT_PRICE_LOWER, DEFAULT_PRICE_UPPER,
	MAX_FEE_BPS, STRATEGY_SALT,
};
use tracing::debug;

/// Encodes strategies for a fixed pair of assets.
#[derive(Debug, Clone, Default)]
pub struct StrategyEncoder {
	assets: AssetPair,
}

impl StrategyEncoder {
	/// Creates an encoder for the given asset pair.
	pub fn new(assets: AssetPair) -> Self {
		Self { assets }
	}

	/// The asset pair every strategy refers to.
	pub fn assets(&self) -> &AssetPair {
		&self.assets
	}

	/// Validates a request and applies defaults, producing the exact field
	/// values that will be encoded.
	pub fn describe(
		&self,
		maker: Address,
		request: &StrategyRequest,
	) -> Result<StrategyDescriptor, EncodingError> {
		let fee_bps = request.fee_bps();
		if fee_bps < 0 {
			return Err(EncodingError::Negative {
				field: "fee_bps",
				value: fee_bps.to_string(),
			});
		}
		if fee_bps >= MAX_FEE_BPS {
			return Err(EncodingError::FeeOutOfRange(fee_bps));
		}

		let parameters = match request {
			StrategyRequest::Stableswap {
				amplification_factor,
				..
			} => {
				let factor = amplification_factor.unwrap_or(DEFAULT_AMPLIFICATION_FACTOR);
				if factor < 0 {
					return Err(EncodingError::Negative {
						field: "amplification_factor",
						value: factor.to_string(),
					});
				}
				if factor == 0 {
					return Err(EncodingError::InvalidAmplification(factor));
				}
				StrategyParameters::Stableswap {
					amplification_factor: U256::from(factor as u64),
				}
			}
			StrategyRequest::Concentrated {
				price_lower,
				price_upper,
				..
			} => {
				let lower = parse_uint256(
					"price_lower",
					price_lower.as_deref().unwrap_or(DEFAULT_PRICE_LOWER),
				)?;
				let upper = parse_uint256(
					"price_upper",
					price_upper.as_deref().unwrap_or(DEFAULT_PRICE_UPPER),
				)?;
				if lower >= upper {
					return Err(EncodingError::InvalidPriceRange {
						lower: lower.to_string(),
						upper: upper.to_string(),
					});
				}
				StrategyParameters::Concentrated {
					price_lower: lower,
					price_upper: upper,
				}
			}
		};

		Ok(StrategyDescriptor {
			maker,
			asset_ids: self.assets.ids(),
			fee_bps: U256::from(fee_bps as u64),
			parameters,
			salt: STRATEGY_SALT,
		})
	}

	/// Validates and encodes a request on behalf of `maker`.
	pub fn encode(
		&self,
		maker: Address,
		request: &StrategyRequest,
	) -> Result<EncodedStrategy, EncodingError> {
		let descriptor = self.describe(maker, request)?;
		let encoded = encode_descriptor(&descriptor);
		debug!(
			kind = %encoded.kind(),
			len = encoded.len(),
			"Encoded strategy"
		);
		Ok(encoded)
	}

	/// Decodes a blob produced by [`StrategyEncoder::encode`].
	pub fn decode(kind: StrategyKind, data: &[u8]) -> Result<StrategyDescriptor, EncodingError> {
		if data.len() != kind.encoded_len() {
			return Err(EncodingError::Malformed(format!(
				"{} strategy must be {} bytes, got {}",
				kind,
				kind.encoded_len(),
				data.len()
			)));
		}

		let malformed = |e: alloy_sol_types::Error| EncodingError::Malformed(e.to_string());
		match kind {
			StrategyKind::Stableswap => {
				let s =
					<StableswapStrategy as SolType>::abi_decode_validate(data).map_err(malformed)?;
				Ok(StrategyDescriptor {
					maker: s.maker,
					asset_ids: [CanonicalAssetId(s.token0Id), CanonicalAssetId(s.token1Id)],
					fee_bps: s.feeBps,
					parameters: StrategyParameters::Stableswap {
						amplification_factor: s.amplificationFactor,
					},
					salt: s.salt,
				})
			}
			StrategyKind::Concentrated => {
				let s =
					<ConcentratedStrategy as SolType>::abi_decode_validate(data).map_err(malformed)?;
				Ok(StrategyDescriptor {
					maker: s.maker,
					asset_ids: [CanonicalAssetId(s.token0Id), CanonicalAssetId(s.token1Id)],
					fee_bps: s.feeBps,
					parameters: StrategyParameters::Concentrated {
						price_lower: s.priceLower,
						price_upper: s.priceUpper,
					},
					salt: s.salt,
				})
			}
		}
	}
}

/// Serializes an already validated descriptor.
pub fn encode_descriptor(descriptor: &StrategyDescriptor) -> EncodedStrategy {
	let [asset0, asset1] = descriptor.asset_ids;
	let bytes = match descriptor.parameters {
		StrategyParameters::Stableswap {
			amplification_factor,
		} => <StableswapStrategy as SolType>::abi_encode(&StableswapStrategy {
			maker: descriptor.maker,
			token0Id: asset0.0,
			token1Id: asset1.0,
			feeBps: descriptor.fee_bps,
			amplificationFactor: amplification_factor,
			salt: descriptor.salt,
		}),
		StrategyParameters::Concentrated {
			price_lower,
			price_upper,
		} => <ConcentratedStrategy as SolType>::abi_encode(&ConcentratedStrategy {
			maker: descriptor.maker,
			token0Id: asset0.0,
			token1Id: asset1.0,
			feeBps: descriptor.fee_bps,
			priceLower: price_lower,
			priceUpper: price_upper,
			salt: descriptor.salt,
		}),
	};
	EncodedStrategy::new(descriptor.kind(), Bytes::from(bytes))
}

/// Parses a non-negative decimal or `0x`-hex integer that must fit in 256 bits.
fn parse_uint256(field: &'static str, raw: &str) -> Result<U256, EncodingError> {
	let trimmed = raw.trim();
	if trimmed.starts_with('-') {
		return Err(EncodingError::Negative {
			field,
			value: trimmed.to_string(),
		});
	}

	let (digits, radix) = match trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
	{
		Some(hex) => (hex, 16),
		None => (trimmed, 10),
	};

	let invalid = |reason: String| EncodingError::InvalidNumber {
		field,
		value: trimmed.to_string(),
		reason,
	};

	if digits.is_empty() {
		return Err(invalid("no digits".to_string()));
	}

	U256::from_str_radix(digits, radix).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::identifier_for;
	use alloy_primitives::{address, B256};

	const MAKER: Address = address!("0x00000000000000000000000000000000000000aa");

	fn encoder() -> StrategyEncoder {
		StrategyEncoder::default()
	}

	fn word(data: &[u8], index: usize) -> &[u8] {
		&data[index * 32..(index + 1) * 32]
	}

	#[test]
	fn test_stableswap_defaults_layout() {
		let encoded = encoder()
			.encode(MAKER, &StrategyRequest::stableswap(30))
			.unwrap();
		let data = encoded.as_bytes();

		assert_eq!(encoded.kind(), StrategyKind::Stableswap);
		assert_eq!(data.len(), 192);
		// address is left-padded to a full word
		assert_eq!(&word(data, 0)[..12], &[0u8; 12]);
		assert_eq!(&word(data, 0)[12..], MAKER.as_slice());
		assert_eq!(word(data, 1), identifier_for("USDC").0.as_slice());
		assert_eq!(word(data, 2), identifier_for("USDT").0.as_slice());
		assert_eq!(U256::from_be_slice(word(data, 3)), U256::from(30u64));
		assert_eq!(U256::from_be_slice(word(data, 4)), U256::from(100u64));
		assert_eq!(word(data, 5), &[0u8; 32]);
	}

	#[test]
	fn test_stableswap_round_trip() {
		let request = StrategyRequest::Stableswap {
			fee_bps: 9_999,
			amplification_factor: Some(2_000),
		};
		let descriptor = encoder().describe(MAKER, &request).unwrap();
		let encoded = encode_descriptor(&descriptor);

		let decoded = StrategyEncoder::decode(StrategyKind::Stableswap, encoded.as_bytes()).unwrap();
		assert_eq!(decoded, descriptor);
		assert_eq!(
			decoded.parameters,
			StrategyParameters::Stableswap {
				amplification_factor: U256::from(2_000u64)
			}
		);
	}

	#[test]
	fn test_concentrated_defaults_and_round_trip() {
		let encoded = encoder()
			.encode(MAKER, &StrategyRequest::concentrated(5))
			.unwrap();
		assert_eq!(encoded.len(), 224);

		let decoded =
			StrategyEncoder::decode(StrategyKind::Concentrated, encoded.as_bytes()).unwrap();
		assert_eq!(decoded.maker, MAKER);
		assert_eq!(decoded.fee_bps, U256::from(5u64));
		assert_eq!(decoded.salt, B256::ZERO);
		assert_eq!(
			decoded.parameters,
			StrategyParameters::Concentrated {
				price_lower: U256::from(900_000_000_000_000_000u64),
				price_upper: U256::from(1_100_000_000_000_000_000u64),
			}
		);
	}

	#[test]
	fn test_concentrated_accepts_hex_prices() {
		let request = StrategyRequest::Concentrated {
			fee_bps: 1,
			price_lower: Some("0x0de0b6b3a7640000".to_string()),
			price_upper: Some("2000000000000000000".to_string()),
		};
		let descriptor = encoder().describe(MAKER, &request).unwrap();
		assert_eq!(
			descriptor.parameters,
			StrategyParameters::Concentrated {
				price_lower: U256::from(1_000_000_000_000_000_000u64),
				price_upper: U256::from(2_000_000_000_000_000_000u64),
			}
		);
	}

	#[test]
	fn test_rejects_inverted_or_empty_price_range() {
		for (lower, upper) in [("2", "1"), ("5", "5")] {
			let request = StrategyRequest::Concentrated {
				fee_bps: 1,
				price_lower: Some(lower.to_string()),
				price_upper: Some(upper.to_string()),
			};
			assert!(matches!(
				encoder().encode(MAKER, &request),
				Err(EncodingError::InvalidPriceRange { .. })
			));
		}

		// an explicit lower bound above the default upper bound
		let request = StrategyRequest::Concentrated {
			fee_bps: 1,
			price_lower: Some("2000000000000000000".to_string()),
			price_upper: None,
		};
		assert!(matches!(
			encoder().encode(MAKER, &request),
			Err(EncodingError::InvalidPriceRange { .. })
		));
	}

	#[test]
	fn test_rejects_bad_numbers() {
		let with_lower = |lower: &str| StrategyRequest::Concentrated {
			fee_bps: 1,
			price_lower: Some(lower.to_string()),
			price_upper: None,
		};

		assert!(matches!(
			encoder().encode(MAKER, &with_lower("-1")),
			Err(EncodingError::Negative {
				field: "price_lower",
				..
			})
		));
		assert!(matches!(
			encoder().encode(MAKER, &with_lower("0xzz")),
			Err(EncodingError::InvalidNumber { .. })
		));
		assert!(matches!(
			encoder().encode(MAKER, &with_lower("0x")),
			Err(EncodingError::InvalidNumber { .. })
		));
		assert!(matches!(
			encoder().encode(MAKER, &with_lower("12.5")),
			Err(EncodingError::InvalidNumber { .. })
		));
		// 2^256 does not fit
		let too_big = format!("0x1{}", "0".repeat(64));
		assert!(matches!(
			encoder().encode(MAKER, &with_lower(&too_big)),
			Err(EncodingError::InvalidNumber { .. })
		));
	}

	#[test]
	fn test_rejects_bad_fee_and_amplification() {
		assert_eq!(
			encoder().encode(MAKER, &StrategyRequest::stableswap(-1)),
			Err(EncodingError::Negative {
				field: "fee_bps",
				value: "-1".to_string()
			})
		);
		assert_eq!(
			encoder().encode(MAKER, &StrategyRequest::stableswap(10_000)),
			Err(EncodingError::FeeOutOfRange(10_000))
		);
		assert_eq!(
			encoder().encode(
				MAKER,
				&StrategyRequest::Stableswap {
					fee_bps: 30,
					amplification_factor: Some(0),
				}
			),
			Err(EncodingError::InvalidAmplification(0))
		);
		assert!(matches!(
			encoder().encode(
				MAKER,
				&StrategyRequest::Stableswap {
					fee_bps: 30,
					amplification_factor: Some(-3),
				}
			),
			Err(EncodingError::Negative { .. })
		));
	}

	#[test]
	fn test_decode_rejects_wrong_length() {
		let encoded = encoder()
			.encode(MAKER, &StrategyRequest::stableswap(30))
			.unwrap();
		assert!(matches!(
			StrategyEncoder::decode(StrategyKind::Concentrated, encoded.as_bytes()),
			Err(EncodingError::Malformed(_))
		));
	}

	#[test]
	fn test_decode_rejects_dirty_address_word() {
		let encoded = encoder()
			.encode(MAKER, &StrategyRequest::concentrated(5))
			.unwrap();
		let mut data = encoded.as_bytes().to_vec();
		// high bytes of the maker word must stay zero
		data[0] = 0x01;
		assert!(matches!(
			StrategyEncoder::decode(StrategyKind::Concentrated, &data),
			Err(EncodingError::Malformed(_))
		));
	}
}
