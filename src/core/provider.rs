use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;

use crate::core::{
    error::ProviderError,
    types::{ChainBlock, ChainReceipt, ChainTransaction},
};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Read-only view of an Ethereum-compatible node.
///
/// Everything the explorer shows is derived from these calls; implementations are
/// handed to the explorer explicitly so tests can substitute an in-memory chain.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Number of the latest block.
    async fn header_latest(&self) -> ProviderResult<u64>;
    async fn block_by_number(&self, number: u64) -> ProviderResult<ChainBlock>;
    async fn block_by_hash(&self, hash: B256) -> ProviderResult<ChainBlock>;
    async fn transaction_by_hash(&self, hash: B256) -> ProviderResult<ChainTransaction>;
    async fn transaction_receipt(&self, hash: B256) -> ProviderResult<ChainReceipt>;

    /// `eth_call` against the latest state.
    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes>;

    async fn balance(&self, address: Address) -> ProviderResult<U256>;
    async fn transaction_count(&self, address: Address) -> ProviderResult<u64>;
    async fn accounts(&self) -> ProviderResult<Vec<Address>>;
    async fn network_id(&self) -> ProviderResult<u64>;
    async fn gas_price(&self) -> ProviderResult<u128>;
    async fn pending_transaction_count(&self) -> ProviderResult<u64>;
}
