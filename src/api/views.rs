//! JSON shapes returned by the HTTP API.
//!
//! Addresses are EIP-55 checksummed, hashes `0x`-prefixed lowercase, and every
//! arbitrary-precision number is a decimal string.

use serde::Serialize;

use crate::explorer::{
    aggregator::{BlockOutcome, BlockPage, BlockSummary},
    decoder::TokenTransfer,
    model::TransactionDetail,
    pages::{
        AccountInfo, BlockDetails, BlockTransactions, HomePage, NetworkOverview, TransactionInfo,
    },
};
use crate::utils::format::{format_ether, hex_data};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferView {
    pub contract: String,
    pub from: String,
    pub to: String,
    pub raw_amount: String,
    pub normalized_amount: String,
    /// `null` when the token's decimals could not be resolved
    pub decimals: Option<i64>,
}

impl From<&TokenTransfer> for TokenTransferView {
    fn from(transfer: &TokenTransfer) -> Self {
        Self {
            contract: transfer.contract.to_string(),
            from: transfer.from.to_string(),
            to: transfer.to.to_string(),
            raw_amount: transfer.raw_amount.to_string(),
            normalized_amount: transfer.normalized_amount.to_plain_string(),
            decimals: transfer.decimals,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransactionView {
    pub hash: String,
    pub gas: String,
    pub gas_price: String,
    pub nonce: u64,
    pub from: String,
    pub to: String,
    pub data: String,
    pub value_wei: String,
    pub value_ether: String,
}

impl From<&TransactionDetail> for TransactionView {
    fn from(detail: &TransactionDetail) -> Self {
        Self {
            hash: format!("{:?}", detail.hash),
            gas: detail.gas.to_string(),
            gas_price: detail.gas_price.to_string(),
            nonce: detail.nonce,
            from: detail.from.to_string(),
            to: detail.to.to_string(),
            data: hex_data(&detail.input),
            value_wei: detail.value_wei.to_string(),
            value_ether: detail.value_ether.to_plain_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BlockRowView {
    Loaded {
        number: u64,
        hash: String,
        nonce: u64,
        transactions: usize,
        last_transaction_hash: Option<String>,
        gas_used: String,
        mined_on: String,
        status: Option<&'static str>,
        token_transfers: Vec<TokenTransferView>,
    },
    Skipped {
        number: u64,
        reason: String,
    },
}

impl From<&BlockSummary> for BlockRowView {
    fn from(summary: &BlockSummary) -> Self {
        BlockRowView::Loaded {
            number: summary.number,
            hash: format!("{:?}", summary.hash),
            nonce: summary.nonce,
            transactions: summary.transaction_count,
            last_transaction_hash: summary.last_transaction_hash.map(|h| format!("{h:?}")),
            gas_used: summary.gas_used.to_string(),
            mined_on: summary.mined_on.to_rfc3339(),
            status: summary.status.map(|s| s.as_str()),
            token_transfers: summary.token_transfers.iter().map(Into::into).collect(),
        }
    }
}

impl From<&BlockOutcome> for BlockRowView {
    fn from(outcome: &BlockOutcome) -> Self {
        match outcome {
            BlockOutcome::Loaded(summary) => summary.into(),
            BlockOutcome::Skipped { number, reason } => BlockRowView::Skipped {
                number: *number,
                reason: reason.clone(),
            },
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockPageView {
    pub page: u64,
    pub next_page: u64,
    pub prev_page: u64,
    pub partial: bool,
    pub blocks: Vec<BlockRowView>,
}

impl From<&BlockPage> for BlockPageView {
    fn from(page: &BlockPage) -> Self {
        Self {
            page: page.page,
            next_page: page.next_page,
            prev_page: page.prev_page,
            partial: page.partial,
            blocks: page.blocks.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkView {
    pub latest_block: String,
    pub network_id: u64,
    pub pending_transactions: u64,
    pub suggested_gas_price: String,
}

impl From<&NetworkOverview> for NetworkView {
    fn from(overview: &NetworkOverview) -> Self {
        Self {
            latest_block: overview.head_number.to_string(),
            network_id: overview.network_id,
            pending_transactions: overview.pending_transactions,
            suggested_gas_price: overview.suggested_gas_price.to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub address: String,
    pub balance: String,
    pub balance_wei: String,
    pub transaction_count: u64,
}

impl From<&AccountInfo> for AccountView {
    fn from(account: &AccountInfo) -> Self {
        Self {
            address: account.address.to_string(),
            balance: format_ether(&account.balance_ether),
            balance_wei: account.balance_wei.to_string(),
            transaction_count: account.transaction_count,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HomePageView {
    pub network: NetworkView,
    #[serde(flatten)]
    pub blocks: BlockPageView,
    pub accounts: Vec<AccountView>,
}

impl From<&HomePage> for HomePageView {
    fn from(home: &HomePage) -> Self {
        Self {
            network: (&home.overview).into(),
            blocks: (&home.blocks).into(),
            accounts: home.accounts.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockTransactionsView {
    pub block_number: u64,
    pub block_hash: String,
    pub total_transactions: usize,
    pub transactions: Vec<TransactionView>,
    pub token_transfers: Vec<TokenTransferView>,
}

impl From<&BlockTransactions> for BlockTransactionsView {
    fn from(page: &BlockTransactions) -> Self {
        Self {
            block_number: page.block_number,
            block_hash: format!("{:?}", page.block_hash),
            total_transactions: page.transactions.len(),
            transactions: page.transactions.iter().map(Into::into).collect(),
            token_transfers: page.token_transfers.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfoView {
    pub status: &'static str,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub transaction: TransactionView,
    pub token_transfers: Vec<TokenTransferView>,
}

impl From<&TransactionInfo> for TransactionInfoView {
    fn from(info: &TransactionInfo) -> Self {
        Self {
            status: info.status.map(|s| s.as_str()).unwrap_or("PENDING"),
            block_number: info.block_number,
            block_hash: info.block_hash.map(|h| format!("{h:?}")),
            transaction: (&info.detail).into(),
            token_transfers: info.token_transfers.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockDetailsView {
    pub number: u64,
    pub hash: String,
    pub nonce: u64,
    pub transactions: usize,
    pub gas_used: String,
    pub gas_limit: String,
    pub mined_on: String,
    pub difficulty: String,
    pub size: Option<String>,
    pub parent_hash: String,
    pub uncle_hash: String,
}

impl From<&BlockDetails> for BlockDetailsView {
    fn from(details: &BlockDetails) -> Self {
        Self {
            number: details.number,
            hash: format!("{:?}", details.hash),
            nonce: details.nonce,
            transactions: details.transaction_count,
            gas_used: details.gas_used.to_string(),
            gas_limit: details.gas_limit.to_string(),
            mined_on: details.mined_on.to_rfc3339(),
            difficulty: details.difficulty.to_string(),
            size: details.size.map(|s| s.to_string()),
            parent_hash: format!("{:?}", details.parent_hash),
            uncle_hash: format!("{:?}", details.uncle_hash),
        }
    }
}
