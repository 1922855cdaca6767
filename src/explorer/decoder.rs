//! Detects ERC-20 `Transfer` events in receipt logs and turns them into [`TokenTransfer`]s.

use alloy::primitives::{Address, B256};
use bigdecimal::{BigDecimal, num_bigint::BigUint};
use tracing::debug;

use crate::{
    core::{
        provider::ChainDataProvider,
        types::{ChainLog, ChainReceipt},
    },
    explorer::{
        amount::{normalize_amount, raw_amount_from_be_bytes},
        decimals::DecimalsCache,
        signature::is_transfer_topic,
    },
    utils::metrics::ExplorerMetrics,
};

/// signature + indexed `from` + indexed `to`
const TRANSFER_MIN_TOPICS: usize = 3;

/// One decoded ERC-20 transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub contract: Address,
    pub from: Address,
    pub to: Address,
    pub raw_amount: BigUint,
    /// `raw_amount / 10^decimals`; zero when decimals could not be resolved.
    pub normalized_amount: BigDecimal,
    /// `None` when the token's `decimals()` lookup failed.
    pub decimals: Option<i64>,
}

impl TokenTransfer {
    pub fn decimals_known(&self) -> bool {
        self.decimals.is_some()
    }
}

/// A log recognised as a `Transfer` event, before amount normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLog {
    pub contract: Address,
    pub from: Address,
    pub to: Address,
    pub raw_amount: BigUint,
}

impl TransferLog {
    pub fn into_transfer(self, decimals: Option<i64>) -> TokenTransfer {
        let normalized_amount = match decimals {
            Some(decimals) => normalize_amount(&self.raw_amount, decimals),
            None => BigDecimal::from(0),
        };
        TokenTransfer {
            contract: self.contract,
            from: self.from,
            to: self.to,
            raw_amount: self.raw_amount,
            normalized_amount,
            decimals,
        }
    }
}

/// Indexed addresses are left-padded to 32 bytes; the address is the trailing 20.
pub fn topic_to_address(topic: &B256) -> Address {
    Address::from_word(*topic)
}

/// Returns the transfer carried by `log`, or `None` when it is not a `Transfer` event.
pub fn match_transfer_log(log: &ChainLog) -> Option<TransferLog> {
    if log.topics.len() < TRANSFER_MIN_TOPICS || !is_transfer_topic(&log.topics[0]) {
        return None;
    }

    Some(TransferLog {
        contract: log.address,
        from: topic_to_address(&log.topics[1]),
        to: topic_to_address(&log.topics[2]),
        raw_amount: raw_amount_from_be_bytes(&log.data),
    })
}

/// All transfer events of a receipt, in log order.
pub fn match_receipt_transfers(receipt: &ChainReceipt) -> Vec<TransferLog> {
    receipt.logs.iter().filter_map(match_transfer_log).collect()
}

/// Decode the receipt's transfers and normalize each amount with the token's decimals.
///
/// Decimals come from `cache`, so repeated contracts within one aggregation cost a single call.
pub async fn extract_receipt_transfers<P>(
    provider: &P,
    receipt: &ChainReceipt,
    cache: &mut DecimalsCache,
    metrics: &dyn ExplorerMetrics,
) -> Vec<TokenTransfer>
where
    P: ChainDataProvider + ?Sized,
{
    let matched = match_receipt_transfers(receipt);
    if matched.is_empty() {
        return Vec::new();
    }
    debug!(
        "🪙 {} transfer event(s) in tx {}",
        matched.len(),
        receipt.transaction_hash
    );

    let mut transfers = Vec::with_capacity(matched.len());
    for log in matched {
        let decimals = cache.get_or_resolve(provider, log.contract, metrics).await;
        transfers.push(log.into_transfer(decimals));
    }
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::memory::InMemoryProvider, explorer::signature::transfer_topic,
        utils::metrics::NoopExplorerMetrics,
    };
    use alloy::primitives::{U256, address, b256, keccak256};
    use std::str::FromStr;

    const TOKEN: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
    const FROM: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const TO: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

    fn amount_word(value: u128) -> Vec<u8> {
        U256::from(value).to_be_bytes::<32>().to_vec()
    }

    fn transfer_log(contract: Address, value: u128) -> ChainLog {
        ChainLog::new(
            contract,
            vec![transfer_topic(), FROM.into_word(), TO.into_word()],
            amount_word(value),
        )
    }

    fn receipt(logs: Vec<ChainLog>) -> ChainReceipt {
        ChainReceipt {
            transaction_hash: keccak256("tx"),
            block_hash: None,
            block_number: Some(1),
            status: true,
            contract_address: None,
            logs,
        }
    }

    #[test]
    fn topic_address_is_the_trailing_twenty_bytes() {
        let topic = b256!("000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(topic_to_address(&topic), FROM);

        // Non-zero padding is ignored, only the low 20 bytes count.
        let dirty = b256!("ffffffffffffffffffffffffaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(topic_to_address(&dirty), FROM);
    }

    #[test]
    fn matches_transfer_log() {
        let matched = match_transfer_log(&transfer_log(TOKEN, 42)).unwrap();
        assert_eq!(matched.contract, TOKEN);
        assert_eq!(matched.from, FROM);
        assert_eq!(matched.to, TO);
        assert_eq!(matched.raw_amount, BigUint::from(42u8));
    }

    #[test]
    fn other_events_are_never_matched() {
        let approval = keccak256("Approval(address,address,uint256)");
        for topics in [
            vec![approval, FROM.into_word(), TO.into_word()],
            vec![approval, FROM.into_word(), TO.into_word(), B256::ZERO],
            vec![B256::ZERO],
            vec![],
        ] {
            let log = ChainLog::new(TOKEN, topics, amount_word(1));
            assert!(match_transfer_log(&log).is_none());
        }
    }

    #[test]
    fn transfer_signature_with_too_few_topics_is_not_matched() {
        for topics in [
            vec![transfer_topic()],
            vec![transfer_topic(), FROM.into_word()],
        ] {
            let log = ChainLog::new(TOKEN, topics, amount_word(1));
            assert!(match_transfer_log(&log).is_none());
        }
    }

    #[test]
    fn empty_data_is_a_zero_amount() {
        let log = ChainLog::new(
            TOKEN,
            vec![transfer_topic(), FROM.into_word(), TO.into_word()],
            Vec::<u8>::new(),
        );
        assert_eq!(
            match_transfer_log(&log).unwrap().raw_amount,
            BigUint::from(0u8)
        );
    }

    #[test]
    fn unknown_decimals_keep_raw_amount_and_zero_normalized() {
        let transfer = match_transfer_log(&transfer_log(TOKEN, 1234))
            .unwrap()
            .into_transfer(None);
        assert_eq!(transfer.raw_amount, BigUint::from(1234u32));
        assert_eq!(transfer.normalized_amount, BigDecimal::from(0));
        assert!(!transfer.decimals_known());
    }

    #[tokio::test]
    async fn one_token_with_eighteen_decimals() {
        let provider = InMemoryProvider::new().with_token_decimals(TOKEN, 18);
        let metrics = NoopExplorerMetrics::new();
        let mut cache = DecimalsCache::new();

        let transfers = extract_receipt_transfers(
            &provider,
            &receipt(vec![transfer_log(TOKEN, 1_000_000_000_000_000_000)]),
            &mut cache,
            &metrics,
        )
        .await;

        assert_eq!(transfers.len(), 1);
        let transfer = &transfers[0];
        assert_eq!(transfer.contract, TOKEN);
        assert_eq!(transfer.from, FROM);
        assert_eq!(transfer.to, TO);
        assert_eq!(
            transfer.raw_amount,
            BigUint::from(1_000_000_000_000_000_000u64)
        );
        assert_eq!(transfer.normalized_amount, BigDecimal::from_str("1.0").unwrap());
        assert_eq!(transfer.decimals, Some(18));
    }

    #[tokio::test]
    async fn preserves_log_order_and_skips_non_transfers() {
        let other = address!("dddddddddddddddddddddddddddddddddddddddd");
        let provider = InMemoryProvider::new()
            .with_token_decimals(TOKEN, 6)
            .with_token_decimals(other, 0);
        let metrics = NoopExplorerMetrics::new();
        let mut cache = DecimalsCache::new();

        let logs = vec![
            transfer_log(TOKEN, 1_500_000),
            ChainLog::new(other, vec![keccak256("Sync(uint112,uint112)")], amount_word(9)),
            transfer_log(other, 7),
            transfer_log(TOKEN, 250_000),
        ];
        let transfers =
            extract_receipt_transfers(&provider, &receipt(logs), &mut cache, &metrics).await;

        let summary: Vec<(Address, String)> = transfers
            .iter()
            .map(|t| (t.contract, t.normalized_amount.to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (TOKEN, "1.5".to_string()),
                (other, "7".to_string()),
                (TOKEN, "0.25".to_string()),
            ]
        );
        assert_eq!(provider.call_count(TOKEN), 1);
    }

    #[tokio::test]
    async fn failed_decimals_zero_every_transfer_of_that_contract() {
        let broken = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");
        let provider = InMemoryProvider::new().with_token_decimals(TOKEN, 2);
        let metrics = NoopExplorerMetrics::new();
        let mut cache = DecimalsCache::new();

        let logs = vec![
            transfer_log(broken, 500),
            transfer_log(TOKEN, 500),
            transfer_log(broken, 9_999),
        ];
        let transfers =
            extract_receipt_transfers(&provider, &receipt(logs), &mut cache, &metrics).await;

        assert_eq!(transfers.len(), 3);
        assert_eq!(transfers[0].raw_amount, BigUint::from(500u32));
        assert_eq!(transfers[0].normalized_amount, BigDecimal::from(0));
        assert_eq!(transfers[1].normalized_amount, BigDecimal::from(5));
        assert_eq!(transfers[2].raw_amount, BigUint::from(9_999u32));
        assert_eq!(transfers[2].normalized_amount, BigDecimal::from(0));
        assert_eq!(transfers[2].decimals, None);
    }
}
