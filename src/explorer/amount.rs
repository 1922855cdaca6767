//! Exact scaling of raw integer amounts into display decimals.
//!
//! `BigDecimal` keeps an arbitrary-precision integer plus a base-10 scale, so
//! `raw / 10^decimals` is represented without any rounding, for any `decimals`
//! the ABI allows (0..=255) and any raw amount width.

use alloy::primitives::U256;
use bigdecimal::{
    BigDecimal,
    num_bigint::{BigInt, BigUint},
};

/// Decimals of the chain's native currency (wei → ether).
pub const ETHER_DECIMALS: i64 = 18;

/// Interpret bytes as a big-endian unsigned integer. Empty input is zero.
pub fn raw_amount_from_be_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

pub fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

/// `raw / 10^decimals`, exact.
pub fn normalize_amount(raw: &BigUint, decimals: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(raw.clone()), decimals).normalized()
}

pub fn wei_to_ether(wei: U256) -> BigDecimal {
    normalize_amount(&u256_to_biguint(wei), ETHER_DECIMALS)
}
