//! Home-page pagination: which blocks a page shows, and assembling their summaries.

use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use alloy::primitives::B256;
use chrono::{DateTime, Utc};
use tokio::{task::JoinSet, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    core::{
        error::{ExplorerError, ProviderError},
        provider::ChainDataProvider,
        types::{ChainBlock, ChainReceipt, ChainTransaction},
    },
    explorer::{
        context::ExplorerContext,
        decimals::DecimalsCache,
        decoder::{TokenTransfer, extract_receipt_transfers},
        model::{ReceiptStatus, TransactionDetail, mined_on},
    },
    utils::metrics::BlockSkipReason,
};

pub const BLOCKS_IN_PAGE: u64 = 10;

/// Block numbers shown by one page plus its pagination cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Highest block number of the window (inclusive).
    pub first_block: i64,
    /// Lower bound of the window (exclusive).
    pub last_block: i64,
    pub next_page: u64,
    pub prev_page: u64,
}

impl PageWindow {
    pub fn compute(head: u64, page: u64) -> Self {
        let size = BLOCKS_IN_PAGE as i64;
        let head = i64::try_from(head).unwrap_or(i64::MAX);
        let offset = i64::try_from(page)
            .unwrap_or(i64::MAX)
            .saturating_mul(size);

        let mut first_block = head.saturating_sub(offset);
        if first_block < 0 {
            // Past genesis: fall back to the earliest window, never above the head.
            first_block = size.min(head);
        }
        let last_block = first_block - size;

        let next_page = if last_block <= 0 { page } else { page + 1 };
        let prev_page = page.saturating_sub(1);

        Self {
            first_block,
            last_block,
            next_page,
            prev_page,
        }
    }

    /// Most recent first, never below block 1.
    pub fn block_numbers(&self) -> Vec<u64> {
        (self.last_block + 1..=self.first_block)
            .rev()
            .take_while(|number| *number >= 1)
            .map(|number| number as u64)
            .collect()
    }

    pub fn reached_genesis(&self) -> bool {
        self.last_block <= 0
    }
}

/// One row of the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: B256,
    pub nonce: u64,
    pub transaction_count: usize,
    pub last_transaction_hash: Option<B256>,
    pub gas_used: u128,
    pub mined_on: DateTime<Utc>,
    /// Status of the block's last transaction; `None` for empty blocks.
    pub status: Option<ReceiptStatus>,
    pub token_transfers: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Loaded(BlockSummary),
    Skipped { number: u64, reason: String },
}

impl BlockOutcome {
    pub fn number(&self) -> u64 {
        match self {
            BlockOutcome::Loaded(summary) => summary.number,
            BlockOutcome::Skipped { number, .. } => *number,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BlockOutcome::Skipped { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPage {
    pub head_number: u64,
    pub page: u64,
    pub blocks: Vec<BlockOutcome>,
    pub next_page: u64,
    pub prev_page: u64,
    /// At least one block of the window could not be loaded.
    pub partial: bool,
}

/// Transactions of one block with their receipts' transfer events.
pub struct BlockContents {
    pub block_hash: B256,
    pub transactions: Vec<TransactionDetail>,
    pub token_transfers: Vec<TokenTransfer>,
    pub last_status: Option<ReceiptStatus>,
}

pub struct BlockRangeAggregator<P: ?Sized> {
    provider: Arc<P>,
    context: ExplorerContext,
}

impl<P> BlockRangeAggregator<P>
where
    P: ChainDataProvider + ?Sized + 'static,
{
    pub fn new(provider: Arc<P>, context: ExplorerContext) -> Self {
        Self { provider, context }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn context(&self) -> &ExplorerContext {
        &self.context
    }

    /// Assemble home page `page`, bounded by the configured page timeout.
    pub async fn load_page(&self, page: u64) -> Result<BlockPage, ExplorerError> {
        self.within_page_timeout(page, self.assemble_page(page))
            .await
    }

    /// Run `work` under `explorer.page_timeout_secs`. Dropping the work on expiry
    /// aborts every receipt fetch it still owns.
    pub async fn within_page_timeout<T, F>(&self, page: u64, work: F) -> Result<T, ExplorerError>
    where
        F: Future<Output = Result<T, ExplorerError>>,
    {
        let limit_secs = self.context.config.page_timeout_secs;
        match timeout(Duration::from_secs(limit_secs), work).await {
            Ok(result) => result,
            Err(_) => {
                warn!("⏱️ Page {} not assembled within {}s", page, limit_secs);
                Err(ExplorerError::Timeout(limit_secs))
            }
        }
    }

    /// Walk the page window. A failed head lookup fails the page; a failed block only skips it.
    pub async fn assemble_page(&self, page: u64) -> Result<BlockPage, ExplorerError> {
        let started = Instant::now();
        let head_number = self.provider.header_latest().await?;
        self.context.metrics().record_chain_head(head_number);

        let window = PageWindow::compute(head_number, page);
        debug!(
            "🪟 Page {} window ({}, {}] on head {}, genesis={}",
            page,
            window.last_block,
            window.first_block,
            head_number,
            window.reached_genesis()
        );

        let mut cache = DecimalsCache::new();
        let mut blocks = Vec::new();
        for number in window.block_numbers() {
            match self.summarize_block(number, &mut cache).await {
                Ok(summary) => blocks.push(BlockOutcome::Loaded(summary)),
                Err(e) => {
                    warn!("⚠️ Skipping block {}: {}", number, e);
                    let reason = if e.is_not_found() {
                        BlockSkipReason::NotFound
                    } else {
                        BlockSkipReason::Rpc
                    };
                    self.context.metrics().record_block_skipped(reason);
                    blocks.push(BlockOutcome::Skipped {
                        number,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let partial = blocks.iter().any(BlockOutcome::is_skipped);
        self.context
            .metrics()
            .record_page_rendered(started.elapsed(), blocks.len());
        info!(
            "📄 Page {} ready: {} block(s), head {}, partial={}",
            page,
            blocks.len(),
            head_number,
            partial
        );

        Ok(BlockPage {
            head_number,
            page,
            blocks,
            next_page: window.next_page,
            prev_page: window.prev_page,
            partial,
        })
    }

    /// Fetch block `number`, its receipts, and derive the home-page row.
    pub async fn summarize_block(
        &self,
        number: u64,
        cache: &mut DecimalsCache,
    ) -> Result<BlockSummary, ProviderError> {
        let block = self.provider.block_by_number(number).await?;
        let contents = self.block_contents(&block, cache).await?;

        Ok(BlockSummary {
            number: block.number,
            hash: contents.block_hash,
            nonce: block.nonce,
            transaction_count: block.transactions.len(),
            last_transaction_hash: block.transactions.last().map(|tx| tx.hash),
            gas_used: block.gas_used,
            mined_on: mined_on(&block),
            status: contents.last_status,
            token_transfers: contents.token_transfers,
        })
    }

    /// Transaction details and token transfers of an already fetched block.
    pub async fn block_contents(
        &self,
        block: &ChainBlock,
        cache: &mut DecimalsCache,
    ) -> Result<BlockContents, ProviderError> {
        let receipts = self.fetch_receipts(&block.transactions).await?;

        let mut transactions = Vec::with_capacity(block.transactions.len());
        let mut token_transfers = Vec::new();
        for (tx, receipt) in block.transactions.iter().zip(&receipts) {
            transactions.push(TransactionDetail::new(tx, Some(receipt)));
            token_transfers.extend(
                extract_receipt_transfers(
                    self.provider.as_ref(),
                    receipt,
                    cache,
                    self.context.metrics(),
                )
                .await,
            );
        }

        // Receipts carry the canonical block hash; prefer it over the header's.
        let block_hash = receipts
            .first()
            .and_then(|receipt| receipt.block_hash)
            .unwrap_or(block.hash);

        Ok(BlockContents {
            block_hash,
            transactions,
            token_transfers,
            last_status: receipts.last().map(ReceiptStatus::from_receipt),
        })
    }

    /// Receipts in transaction order, fetched concurrently under the RPC semaphore.
    ///
    /// The first failure wins; fetches still in flight are aborted when the set is dropped.
    pub async fn fetch_receipts(
        &self,
        transactions: &[ChainTransaction],
    ) -> Result<Vec<ChainReceipt>, ProviderError> {
        let mut tasks = JoinSet::new();
        for (index, tx) in transactions.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&self.context.rpc_semaphore);
            let hash = tx.hash;
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ProviderError::Rpc(format!("rpc semaphore closed: {e}")))?;
                provider
                    .transaction_receipt(hash)
                    .await
                    .map(|receipt| (index, receipt))
            });
        }

        let mut slots: Vec<Option<ChainReceipt>> = vec![None; transactions.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, receipt) =
                joined.map_err(|e| ProviderError::Rpc(format!("receipt task failed: {e}")))??;
            slots[index] = Some(receipt);
        }

        slots
            .into_iter()
            .zip(transactions)
            .map(|(slot, tx)| {
                slot.ok_or_else(|| {
                    ProviderError::InvalidResponse(format!("no receipt collected for {}", tx.hash))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pages_of_a_long_chain() {
        let page0 = PageWindow::compute(105, 0);
        assert_eq!(
            page0.block_numbers(),
            vec![105, 104, 103, 102, 101, 100, 99, 98, 97, 96]
        );
        assert_eq!((page0.next_page, page0.prev_page), (1, 0));

        let page1 = PageWindow::compute(105, 1);
        assert_eq!(page1.block_numbers(), (86..=95).rev().collect::<Vec<u64>>());
        assert_eq!((page1.next_page, page1.prev_page), (2, 0));
    }

    #[test]
    fn window_is_truncated_at_block_one() {
        let window = PageWindow::compute(105, 10);
        assert_eq!(window.block_numbers(), vec![5, 4, 3, 2, 1]);
        assert!(window.reached_genesis());
        assert_eq!(window.next_page, 10);
        assert_eq!(window.prev_page, 9);
    }

    #[test]
    fn page_past_genesis_falls_back_to_earliest_window() {
        let window = PageWindow::compute(105, 40);
        assert_eq!(window.block_numbers(), (1..=10).rev().collect::<Vec<u64>>());
        assert_eq!(window.last_block, 0);
        assert_eq!(window.next_page, 40);
        assert_eq!(window.prev_page, 39);
    }

    #[test]
    fn short_chains_never_list_block_zero_or_beyond_head() {
        let window = PageWindow::compute(4, 0);
        assert_eq!(window.block_numbers(), vec![4, 3, 2, 1]);
        assert_eq!(window.next_page, 0);

        let window = PageWindow::compute(4, 3);
        assert_eq!(window.block_numbers(), vec![4, 3, 2, 1]);

        let window = PageWindow::compute(0, 0);
        assert!(window.block_numbers().is_empty());
    }

    #[test]
    fn exact_boundary_stops_advancing() {
        let window = PageWindow::compute(20, 1);
        assert_eq!(window.block_numbers(), (1..=10).rev().collect::<Vec<u64>>());
        assert_eq!(window.next_page, 1);
    }

    #[test]
    fn windows_are_strictly_decreasing_and_positive() {
        for head in [0u64, 1, 9, 10, 11, 57, 105, 1_000] {
            for page in 0u64..120 {
                let window = PageWindow::compute(head, page);
                let numbers = window.block_numbers();
                assert!(numbers.len() as u64 <= BLOCKS_IN_PAGE);
                assert!(numbers.iter().all(|n| *n >= 1 && *n <= head.max(1)));
                assert!(numbers.windows(2).all(|w| w[0] > w[1]));
                assert!(window.prev_page <= page);
                assert!(window.next_page == page || window.next_page == page + 1);
            }
        }
    }
}
