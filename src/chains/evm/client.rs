use std::{future::Future, sync::Arc, time::Duration};

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, B256, Bytes, U64, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{Block, BlockTransactions, Transaction, TransactionReceipt, TransactionRequest},
    transports::http::{Client, Http},
};
use anyhow::Result;
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;

use crate::core::{
    error::ProviderError,
    provider::{ChainDataProvider, ProviderResult},
    types::{ChainBlock, ChainLog, ChainReceipt, ChainTransaction},
};

/// [`ChainDataProvider`] backed by an alloy HTTP provider.
pub struct EvmClient {
    pub provider: Arc<RootProvider<Http<Client>>>,
    request_timeout: Duration,
}

impl EvmClient {
    pub fn new(rpc_url: &str, timeout_secs: u64) -> Result<Self> {
        let provider = Arc::new(ProviderBuilder::new().on_http(rpc_url.parse()?));
        Ok(Self {
            provider,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    async fn request<T, E, F>(&self, method: &str, fut: F) -> ProviderResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        debug!("📡 {}", method);
        match timeout(self.request_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ProviderError::Rpc(format!("{method} failed: {e}"))),
            Err(_) => Err(ProviderError::Rpc(format!(
                "{method} timed out after {:?}",
                self.request_timeout
            ))),
        }
    }
}

#[async_trait]
impl ChainDataProvider for EvmClient {
    async fn header_latest(&self) -> ProviderResult<u64> {
        self.request("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    async fn block_by_number(&self, number: u64) -> ProviderResult<ChainBlock> {
        let block = self
            .request(
                "eth_getBlockByNumber",
                self.provider.get_block_by_number(number.into(), true),
            )
            .await?
            .ok_or_else(|| ProviderError::not_found(format!("block {number}")))?;
        convert_block(block)
    }

    async fn block_by_hash(&self, hash: B256) -> ProviderResult<ChainBlock> {
        let block: Option<Block> = self
            .request(
                "eth_getBlockByHash",
                self.provider
                    .raw_request("eth_getBlockByHash".into(), (hash, true)),
            )
            .await?;
        let block = block.ok_or_else(|| ProviderError::not_found(format!("block {hash}")))?;
        convert_block(block)
    }

    async fn transaction_by_hash(&self, hash: B256) -> ProviderResult<ChainTransaction> {
        self.request(
            "eth_getTransactionByHash",
            self.provider.get_transaction_by_hash(hash),
        )
        .await?
        .map(convert_transaction)
        .ok_or_else(|| ProviderError::not_found(format!("transaction {hash}")))
    }

    async fn transaction_receipt(&self, hash: B256) -> ProviderResult<ChainReceipt> {
        self.request(
            "eth_getTransactionReceipt",
            self.provider.get_transaction_receipt(hash),
        )
        .await?
        .map(convert_receipt)
        .ok_or_else(|| ProviderError::not_found(format!("receipt {hash}")))
    }

    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.request("eth_call", async { self.provider.call(&tx).await })
            .await
    }

    async fn balance(&self, address: Address) -> ProviderResult<U256> {
        self.request("eth_getBalance", async {
            self.provider.get_balance(address).await
        })
        .await
    }

    async fn transaction_count(&self, address: Address) -> ProviderResult<u64> {
        self.request("eth_getTransactionCount", async {
            self.provider.get_transaction_count(address).await
        })
        .await
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        self.request("eth_accounts", self.provider.get_accounts())
            .await
    }

    async fn network_id(&self) -> ProviderResult<u64> {
        self.request("net_version", self.provider.get_net_version())
            .await
    }

    async fn gas_price(&self) -> ProviderResult<u128> {
        self.request("eth_gasPrice", self.provider.get_gas_price())
            .await
    }

    async fn pending_transaction_count(&self) -> ProviderResult<u64> {
        let count: Option<U64> = self
            .request(
                "eth_getBlockTransactionCountByNumber",
                self.provider.raw_request(
                    "eth_getBlockTransactionCountByNumber".into(),
                    ("pending",),
                ),
            )
            .await?;
        Ok(count.map(|c| c.to::<u64>()).unwrap_or_default())
    }
}

fn convert_block(block: Block) -> ProviderResult<ChainBlock> {
    let header = block.header;
    let transactions = match block.transactions {
        BlockTransactions::Full(txs) => txs.into_iter().map(convert_transaction).collect(),
        BlockTransactions::Hashes(hashes) if !hashes.is_empty() => {
            return Err(ProviderError::InvalidResponse(format!(
                "block {} returned {} transaction hashes instead of full transactions",
                header.number,
                hashes.len()
            )));
        }
        _ => Vec::new(),
    };

    Ok(ChainBlock {
        number: header.number,
        hash: header.hash,
        parent_hash: header.parent_hash,
        uncle_hash: header.uncles_hash,
        nonce: header
            .nonce
            .map(|nonce| u64::from_be_bytes(nonce.0))
            .unwrap_or_default(),
        timestamp: header.timestamp,
        gas_used: u128::from(header.gas_used),
        gas_limit: u128::from(header.gas_limit),
        difficulty: header.difficulty,
        size: block.size,
        transactions,
    })
}

fn convert_transaction(tx: Transaction) -> ChainTransaction {
    ChainTransaction {
        hash: tx.hash,
        from: tx.from,
        to: tx.to,
        gas: u128::from(tx.gas),
        gas_price: tx.gas_price.or(tx.max_fee_per_gas).unwrap_or_default(),
        nonce: tx.nonce,
        input: tx.input,
        value: tx.value,
    }
}

fn convert_receipt(receipt: TransactionReceipt) -> ChainReceipt {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .map(|log| ChainLog {
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data.clone(),
        })
        .collect();

    ChainReceipt {
        transaction_hash: receipt.transaction_hash,
        block_hash: receipt.block_hash,
        block_number: receipt.block_number,
        status: receipt.inner.status(),
        contract_address: receipt.contract_address,
        logs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_rpc_url() {
        assert!(EvmClient::new("not a url", 5).is_err());
    }

    #[tokio::test]
    async fn unreachable_node_surfaces_rpc_error() {
        // Nothing listens on port 9 (discard) locally; the call must fail, not hang.
        let client = EvmClient::new("http://127.0.0.1:9", 2).unwrap();
        let err = client.header_latest().await.unwrap_err();
        assert!(matches!(err, ProviderError::Rpc(_)), "got {err:?}");
    }
}
