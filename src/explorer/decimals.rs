use std::collections::HashMap;

use alloy::primitives::{Address, Bytes};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    core::{error::ProviderError, provider::ChainDataProvider},
    explorer::signature::decimals_selector,
    utils::metrics::{DecimalsLookup, ExplorerMetrics},
};

const ABI_WORD_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum DecimalsError {
    #[error("decimals() call to {address} failed: {source}")]
    Call {
        address: Address,
        #[source]
        source: ProviderError,
    },

    #[error("decimals() returned {len} bytes, expected a 32-byte word")]
    ShortResponse { len: usize },

    #[error("decimals() returned a value that does not fit in uint8")]
    OutOfRange,
}

/// Call data for `decimals()`: the bare 4-byte selector, no arguments.
pub fn encode_decimals_call() -> Bytes {
    Bytes::copy_from_slice(&decimals_selector())
}

/// Decode a `uint8` return word. Only the first 32 bytes are read.
pub fn decode_decimals_return(data: &[u8]) -> Result<u8, DecimalsError> {
    if data.len() < ABI_WORD_LEN {
        return Err(DecimalsError::ShortResponse { len: data.len() });
    }
    let word = &data[..ABI_WORD_LEN];
    if word[..ABI_WORD_LEN - 1].iter().any(|b| *b != 0) {
        return Err(DecimalsError::OutOfRange);
    }
    Ok(word[ABI_WORD_LEN - 1])
}

/// Reads a token's `decimals()` at the latest state. Never retries.
pub async fn resolve_decimals<P>(provider: &P, token: Address) -> Result<i64, DecimalsError>
where
    P: ChainDataProvider + ?Sized,
{
    let result = provider
        .call(token, encode_decimals_call())
        .await
        .map_err(|source| DecimalsError::Call {
            address: token,
            source,
        })?;
    let decimals = decode_decimals_return(&result)?;
    debug!("🔢 Token {} has {} decimals", token, decimals);
    Ok(i64::from(decimals))
}

/// Decimals lookups memoized per contract for the lifetime of one aggregation.
///
/// Failed lookups are remembered as `None` so a broken contract is only called once.
#[derive(Default)]
pub struct DecimalsCache {
    entries: HashMap<Address, Option<i64>>,
}

impl DecimalsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_resolve<P>(
        &mut self,
        provider: &P,
        token: Address,
        metrics: &dyn ExplorerMetrics,
    ) -> Option<i64>
    where
        P: ChainDataProvider + ?Sized,
    {
        if let Some(cached) = self.entries.get(&token) {
            metrics.record_decimals_lookup(DecimalsLookup::Cached);
            return *cached;
        }

        let resolved = match resolve_decimals(provider, token).await {
            Ok(decimals) => {
                metrics.record_decimals_lookup(DecimalsLookup::Resolved);
                Some(decimals)
            }
            Err(e) => {
                warn!("⚠️ Unknown decimals for token {}: {}", token, e);
                metrics.record_decimals_lookup(DecimalsLookup::Failed);
                None
            }
        };
        self.entries.insert(token, resolved);
        resolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::memory::InMemoryProvider, utils::metrics::NoopExplorerMetrics};
    use alloy::primitives::address;

    fn word(value: u8) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[31] = value;
        w
    }

    #[test]
    fn call_data_is_just_the_selector() {
        assert_eq!(&encode_decimals_call()[..], &[0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn decodes_uint8_word() {
        assert_eq!(decode_decimals_return(&word(18)).unwrap(), 18);
        assert_eq!(decode_decimals_return(&word(0)).unwrap(), 0);
        assert_eq!(decode_decimals_return(&word(255)).unwrap(), 255);
    }

    #[test]
    fn rejects_short_and_oversized_returns() {
        assert!(matches!(
            decode_decimals_return(&[]),
            Err(DecimalsError::ShortResponse { len: 0 })
        ));
        assert!(matches!(
            decode_decimals_return(&[18]),
            Err(DecimalsError::ShortResponse { len: 1 })
        ));

        let mut too_big = word(0);
        too_big[30] = 1;
        assert!(matches!(
            decode_decimals_return(&too_big),
            Err(DecimalsError::OutOfRange)
        ));
    }

    #[tokio::test]
    async fn resolves_decimals_through_the_provider() {
        let token = address!("cccccccccccccccccccccccccccccccccccccccc");
        let provider = InMemoryProvider::new().with_token_decimals(token, 6);
        assert_eq!(resolve_decimals(&provider, token).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn reverting_call_is_a_resolver_failure() {
        let token = address!("dddddddddddddddddddddddddddddddddddddddd");
        let provider = InMemoryProvider::new();
        let err = resolve_decimals(&provider, token).await.unwrap_err();
        assert!(matches!(err, DecimalsError::Call { address, .. } if address == token));
    }

    #[tokio::test]
    async fn cache_calls_each_contract_once() {
        let good = address!("cccccccccccccccccccccccccccccccccccccccc");
        let bad = address!("dddddddddddddddddddddddddddddddddddddddd");
        let provider = InMemoryProvider::new().with_token_decimals(good, 18);
        let metrics = NoopExplorerMetrics::new();
        let mut cache = DecimalsCache::new();

        for _ in 0..3 {
            assert_eq!(cache.get_or_resolve(&provider, good, &metrics).await, Some(18));
            assert_eq!(cache.get_or_resolve(&provider, bad, &metrics).await, None);
        }

        assert_eq!(provider.call_count(good), 1);
        assert_eq!(provider.call_count(bad), 1);
        assert_eq!(cache.len(), 2);
    }
}
