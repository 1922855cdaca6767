//! Fixed ERC-20 protocol constants: the `Transfer` event topic and the `decimals()` selector.

use std::sync::LazyLock;

use alloy::primitives::{B256, keccak256};

pub const ERC20_TRANSFER_SIGNATURE: &str = "Transfer(address,address,uint256)";
pub const ERC20_DECIMALS_SIGNATURE: &str = "decimals()";

static TRANSFER_TOPIC: LazyLock<B256> = LazyLock::new(|| keccak256(ERC20_TRANSFER_SIGNATURE));

static DECIMALS_SELECTOR: LazyLock<[u8; 4]> = LazyLock::new(|| {
    let hash = keccak256(ERC20_DECIMALS_SIGNATURE);
    [hash[0], hash[1], hash[2], hash[3]]
});

/// Keccak-256 of `Transfer(address,address,uint256)`, expected as topic[0] of transfer logs.
pub fn transfer_topic() -> B256 {
    *TRANSFER_TOPIC
}

/// First four bytes of Keccak-256 of `decimals()`.
pub fn decimals_selector() -> [u8; 4] {
    *DECIMALS_SELECTOR
}

pub fn is_transfer_topic(topic: &B256) -> bool {
    *topic == *TRANSFER_TOPIC
}
