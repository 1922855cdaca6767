//! Read models behind the explorer's pages, assembled from live node data on every request.

use std::{str::FromStr, sync::Arc};

use alloy::primitives::{Address, B256, U256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    core::{error::ExplorerError, provider::ChainDataProvider, types::ChainBlock},
    explorer::{
        aggregator::{BlockPage, BlockRangeAggregator},
        amount::wei_to_ether,
        context::ExplorerContext,
        decimals::DecimalsCache,
        decoder::{TokenTransfer, extract_receipt_transfers},
        model::{ReceiptStatus, TransactionDetail, mined_on},
    },
};

/// A block reference as typed by a user: decimal number or 32-byte hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockQuery {
    Number(u64),
    Hash(B256),
}

impl FromStr for BlockQuery {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(number) = s.parse::<u64>() {
            return Ok(BlockQuery::Number(number));
        }
        parse_hash(s).map(BlockQuery::Hash)
    }
}

pub fn parse_hash(s: &str) -> Result<B256, ExplorerError> {
    B256::from_str(s.trim())
        .map_err(|e| ExplorerError::InvalidInput(format!("'{s}' is not a 32-byte hash: {e}")))
}

pub fn parse_address(s: &str) -> Result<Address, ExplorerError> {
    Address::from_str(s.trim())
        .map_err(|e| ExplorerError::InvalidInput(format!("'{s}' is not an address: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkOverview {
    pub head_number: u64,
    pub network_id: u64,
    pub pending_transactions: u64,
    pub suggested_gas_price: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: Address,
    pub balance_wei: U256,
    pub balance_ether: BigDecimal,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePage {
    pub overview: NetworkOverview,
    pub blocks: BlockPage,
    pub accounts: Vec<AccountInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTransactions {
    pub block_number: u64,
    pub block_hash: B256,
    pub transactions: Vec<TransactionDetail>,
    pub token_transfers: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    /// `None` while the transaction has no receipt yet.
    pub status: Option<ReceiptStatus>,
    pub detail: TransactionDetail,
    pub block_number: Option<u64>,
    pub block_hash: Option<B256>,
    pub token_transfers: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDetails {
    pub number: u64,
    pub hash: B256,
    pub nonce: u64,
    pub transaction_count: usize,
    pub gas_used: u128,
    pub gas_limit: u128,
    pub mined_on: DateTime<Utc>,
    pub difficulty: U256,
    pub size: Option<U256>,
    pub parent_hash: B256,
    pub uncle_hash: B256,
}

impl From<&ChainBlock> for BlockDetails {
    fn from(block: &ChainBlock) -> Self {
        Self {
            number: block.number,
            hash: block.hash,
            nonce: block.nonce,
            transaction_count: block.transactions.len(),
            gas_used: block.gas_used,
            gas_limit: block.gas_limit,
            mined_on: mined_on(block),
            difficulty: block.difficulty,
            size: block.size,
            parent_hash: block.parent_hash,
            uncle_hash: block.uncle_hash,
        }
    }
}

/// Entry point for every page the explorer serves.
pub struct Explorer<P: ?Sized> {
    aggregator: BlockRangeAggregator<P>,
}

impl<P> Explorer<P>
where
    P: ChainDataProvider + ?Sized + 'static,
{
    pub fn new(provider: Arc<P>, context: ExplorerContext) -> Self {
        Self {
            aggregator: BlockRangeAggregator::new(provider, context),
        }
    }

    fn provider(&self) -> &P {
        self.aggregator.provider().as_ref()
    }

    /// Block window, network overview and node accounts, all within one page timeout.
    pub async fn home_page(&self, page: u64) -> Result<HomePage, ExplorerError> {
        self.aggregator
            .within_page_timeout(page, self.assemble_home_page(page))
            .await
    }

    async fn assemble_home_page(&self, page: u64) -> Result<HomePage, ExplorerError> {
        let blocks = self.aggregator.assemble_page(page).await?;
        let overview = self.network_overview(blocks.head_number).await?;

        let addresses = match self.provider().accounts().await {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!("⚠️ eth_accounts unavailable: {}", e);
                Vec::new()
            }
        };
        let mut accounts = Vec::with_capacity(addresses.len());
        for address in addresses {
            accounts.push(self.account_info(address).await?);
        }

        Ok(HomePage {
            overview,
            blocks,
            accounts,
        })
    }

    pub async fn network_overview(&self, head_number: u64) -> Result<NetworkOverview, ExplorerError> {
        let network_id = self.provider().network_id().await?;
        let suggested_gas_price = self.provider().gas_price().await?;
        let pending_transactions = self
            .provider()
            .pending_transaction_count()
            .await
            .unwrap_or_else(|e| {
                warn!("⚠️ Pending transaction count unavailable: {}", e);
                0
            });

        Ok(NetworkOverview {
            head_number,
            network_id,
            pending_transactions,
            suggested_gas_price,
        })
    }

    /// All transactions of a block, with the token transfers found in their receipts.
    pub async fn block_transactions(
        &self,
        query: BlockQuery,
    ) -> Result<BlockTransactions, ExplorerError> {
        let block = match query {
            BlockQuery::Number(number) => self.provider().block_by_number(number).await?,
            BlockQuery::Hash(hash) => self.provider().block_by_hash(hash).await?,
        };
        debug!(
            "🧾 Loading {} transaction(s) of block {}",
            block.transactions.len(),
            block.number
        );

        let mut cache = DecimalsCache::new();
        let contents = self.aggregator.block_contents(&block, &mut cache).await?;

        Ok(BlockTransactions {
            block_number: block.number,
            block_hash: contents.block_hash,
            transactions: contents.transactions,
            token_transfers: contents.token_transfers,
        })
    }

    pub async fn transaction_info(&self, hash: B256) -> Result<TransactionInfo, ExplorerError> {
        let tx = self.provider().transaction_by_hash(hash).await?;
        let receipt = match self.provider().transaction_receipt(hash).await {
            Ok(receipt) => Some(receipt),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        let token_transfers = match &receipt {
            Some(receipt) => {
                let mut cache = DecimalsCache::new();
                extract_receipt_transfers(
                    self.provider(),
                    receipt,
                    &mut cache,
                    self.aggregator.context().metrics(),
                )
                .await
            }
            None => Vec::new(),
        };

        Ok(TransactionInfo {
            status: receipt.as_ref().map(ReceiptStatus::from_receipt),
            detail: TransactionDetail::new(&tx, receipt.as_ref()),
            block_number: receipt.as_ref().and_then(|r| r.block_number),
            block_hash: receipt.as_ref().and_then(|r| r.block_hash),
            token_transfers,
        })
    }

    pub async fn block_details(&self, hash: B256) -> Result<BlockDetails, ExplorerError> {
        let block = self.provider().block_by_hash(hash).await?;
        Ok(BlockDetails::from(&block))
    }

    pub async fn account_info(&self, address: Address) -> Result<AccountInfo, ExplorerError> {
        let balance_wei = self.provider().balance(address).await?;
        let transaction_count = self.provider().transaction_count(address).await?;
        Ok(AccountInfo {
            address,
            balance_wei,
            balance_ether: wei_to_ether(balance_wei),
            transaction_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_query_accepts_numbers_and_hashes() {
        assert_eq!("42".parse::<BlockQuery>().unwrap(), BlockQuery::Number(42));
        assert_eq!(" 7 ".parse::<BlockQuery>().unwrap(), BlockQuery::Number(7));

        let hash = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
        assert_eq!(
            hash.parse::<BlockQuery>().unwrap(),
            BlockQuery::Hash(B256::from_str(hash).unwrap())
        );
    }

    #[test]
    fn block_query_rejects_garbage() {
        let err = "latest-ish".parse::<BlockQuery>().unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput(_)));
        assert!("-1".parse::<BlockQuery>().is_err());
    }

    #[test]
    fn parse_address_validates_length() {
        assert!(parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").is_ok());
        assert!(matches!(
            parse_address("0x1234"),
            Err(ExplorerError::InvalidInput(_))
        ));
    }
}
