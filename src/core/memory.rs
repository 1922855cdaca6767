//! In-memory [`ChainDataProvider`] for tests and offline demos.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy::primitives::{Address, B256, Bytes, U256, keccak256};
use async_trait::async_trait;

use crate::core::{
    error::ProviderError,
    provider::{ChainDataProvider, ProviderResult},
    types::{ChainBlock, ChainReceipt, ChainTransaction},
};

#[derive(Default)]
pub struct InMemoryProvider {
    head: Option<u64>,
    blocks: HashMap<u64, ChainBlock>,
    receipts: HashMap<B256, ChainReceipt>,
    call_results: HashMap<Address, Bytes>,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    accounts: Vec<Address>,
    unavailable_blocks: HashSet<u64>,
    network_id: u64,
    gas_price: u128,
    pending: u64,
    head_unavailable: bool,
    latency: Option<Duration>,
    slow_receipts: HashMap<B256, Duration>,
    calls: Mutex<HashMap<Address, usize>>,
    receipts_served: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            network_id: 1337,
            gas_price: 20_000_000_000,
            ..Default::default()
        }
    }

    /// Override the reported head; defaults to the highest inserted block.
    pub fn with_head(mut self, head: u64) -> Self {
        self.head = Some(head);
        self
    }

    pub fn with_block(mut self, block: ChainBlock) -> Self {
        self.blocks.insert(block.number, block);
        self
    }

    /// Insert empty blocks `1..=head`.
    pub fn with_empty_chain(mut self, head: u64) -> Self {
        for number in 1..=head {
            self.blocks.insert(number, synthetic_block(number, Vec::new()));
        }
        self
    }

    pub fn with_receipt(mut self, receipt: ChainReceipt) -> Self {
        self.receipts.insert(receipt.transaction_hash, receipt);
        self
    }

    /// Make `decimals()` on `token` return `decimals` as a uint8 word.
    pub fn with_token_decimals(mut self, token: Address, decimals: u8) -> Self {
        let mut word = [0u8; 32];
        word[31] = decimals;
        self.call_results
            .insert(token, Bytes::copy_from_slice(&word));
        self
    }

    pub fn with_call_result(mut self, to: Address, result: impl Into<Bytes>) -> Self {
        self.call_results.insert(to, result.into());
        self
    }

    pub fn with_account(mut self, address: Address, balance: U256, nonce: u64) -> Self {
        self.accounts.push(address);
        self.balances.insert(address, balance);
        self.nonces.insert(address, nonce);
        self
    }

    /// Fetching this block fails with an RPC error.
    pub fn with_unavailable_block(mut self, number: u64) -> Self {
        self.unavailable_blocks.insert(number);
        self
    }

    pub fn with_pending_transactions(mut self, pending: u64) -> Self {
        self.pending = pending;
        self
    }

    /// `header_latest` fails with an RPC error.
    pub fn with_head_failure(mut self) -> Self {
        self.head_unavailable = true;
        self
    }

    /// Every block, receipt and `eth_accounts` request sleeps for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The receipt of `tx` is answered only after `delay`.
    pub fn with_slow_receipt(mut self, tx: B256, delay: Duration) -> Self {
        self.slow_receipts.insert(tx, delay);
        self
    }

    /// Receipt requests that ran to completion, found or not.
    pub fn receipts_served(&self) -> usize {
        self.receipts_served.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self, extra: Option<Duration>) {
        let delay = self.latency.unwrap_or_default() + extra.unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// How many `eth_call`s were made against `to`.
    pub fn call_count(&self, to: Address) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&to).copied().unwrap_or_default())
            .unwrap_or_default()
    }
}

/// Deterministic block with a hash derived from its number.
pub fn synthetic_block(number: u64, transactions: Vec<ChainTransaction>) -> ChainBlock {
    ChainBlock {
        number,
        hash: keccak256(number.to_be_bytes()),
        parent_hash: keccak256(number.saturating_sub(1).to_be_bytes()),
        uncle_hash: B256::ZERO,
        nonce: 0,
        timestamp: 1_700_000_000 + number * 12,
        gas_used: 21_000 * transactions.len() as u128,
        gas_limit: 30_000_000,
        difficulty: U256::ZERO,
        size: Some(U256::from(512u64)),
        transactions,
    }
}

#[async_trait]
impl ChainDataProvider for InMemoryProvider {
    async fn header_latest(&self) -> ProviderResult<u64> {
        if self.head_unavailable {
            return Err(ProviderError::Rpc("eth_blockNumber unavailable".to_string()));
        }
        Ok(self
            .head
            .or_else(|| self.blocks.keys().max().copied())
            .unwrap_or_default())
    }

    async fn block_by_number(&self, number: u64) -> ProviderResult<ChainBlock> {
        self.simulate_latency(None).await;
        if self.unavailable_blocks.contains(&number) {
            return Err(ProviderError::Rpc(format!("block {number} unavailable")));
        }
        self.blocks
            .get(&number)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(format!("block {number}")))
    }

    async fn block_by_hash(&self, hash: B256) -> ProviderResult<ChainBlock> {
        self.blocks
            .values()
            .find(|block| block.hash == hash)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(format!("block {hash}")))
    }

    async fn transaction_by_hash(&self, hash: B256) -> ProviderResult<ChainTransaction> {
        self.blocks
            .values()
            .flat_map(|block| block.transactions.iter())
            .find(|tx| tx.hash == hash)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(format!("transaction {hash}")))
    }

    async fn transaction_receipt(&self, hash: B256) -> ProviderResult<ChainReceipt> {
        self.simulate_latency(self.slow_receipts.get(&hash).copied())
            .await;
        self.receipts_served.fetch_add(1, Ordering::SeqCst);
        self.receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| ProviderError::not_found(format!("receipt {hash}")))
    }

    async fn call(&self, to: Address, _data: Bytes) -> ProviderResult<Bytes> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(to).or_default() += 1;
        }
        self.call_results
            .get(&to)
            .cloned()
            .ok_or_else(|| ProviderError::Rpc("execution reverted".to_string()))
    }

    async fn balance(&self, address: Address) -> ProviderResult<U256> {
        Ok(self.balances.get(&address).copied().unwrap_or_default())
    }

    async fn transaction_count(&self, address: Address) -> ProviderResult<u64> {
        Ok(self.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        self.simulate_latency(None).await;
        Ok(self.accounts.clone())
    }

    async fn network_id(&self) -> ProviderResult<u64> {
        Ok(self.network_id)
    }

    async fn gas_price(&self) -> ProviderResult<u128> {
        Ok(self.gas_price)
    }

    async fn pending_transaction_count(&self) -> ProviderResult<u64> {
        Ok(self.pending)
    }
}
