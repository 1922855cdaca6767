use std::fmt;

use alloy::primitives::{Address, B256, Bytes, U256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::{
    core::types::{ChainBlock, ChainReceipt, ChainTransaction},
    explorer::amount::wei_to_ether,
    utils::format::{contract_creation_label, receipt_status_label},
};

/// Where a transaction went: a plain recipient, or the contract it created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxRecipient {
    Address(Address),
    /// `to` was absent; holds the receipt's created contract address when known.
    ContractCreation(Option<Address>),
}

impl TxRecipient {
    pub fn resolve(tx: &ChainTransaction, receipt: Option<&ChainReceipt>) -> Self {
        match tx.to {
            Some(to) => TxRecipient::Address(to),
            None => TxRecipient::ContractCreation(receipt.and_then(|r| r.contract_address)),
        }
    }
}

impl fmt::Display for TxRecipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxRecipient::Address(address) => write!(f, "{address}"),
            TxRecipient::ContractCreation(created) => {
                f.write_str(&contract_creation_label(*created))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Successful,
    Failed,
}

impl ReceiptStatus {
    pub fn from_receipt(receipt: &ChainReceipt) -> Self {
        if receipt.status {
            ReceiptStatus::Successful
        } else {
            ReceiptStatus::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        receipt_status_label(matches!(self, ReceiptStatus::Successful))
    }
}

/// Summary of one transaction, derived from the transaction and its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetail {
    pub hash: B256,
    pub gas: u128,
    pub gas_price: u128,
    pub nonce: u64,
    pub from: Address,
    pub to: TxRecipient,
    pub input: Bytes,
    pub value_wei: U256,
    pub value_ether: BigDecimal,
}

impl TransactionDetail {
    pub fn new(tx: &ChainTransaction, receipt: Option<&ChainReceipt>) -> Self {
        Self {
            hash: tx.hash,
            gas: tx.gas,
            gas_price: tx.gas_price,
            nonce: tx.nonce,
            from: tx.from,
            to: TxRecipient::resolve(tx, receipt),
            input: tx.input.clone(),
            value_wei: tx.value,
            value_ether: wei_to_ether(tx.value),
        }
    }
}

/// Block creation time; out-of-range timestamps fall back to the epoch.
pub fn mined_on(block: &ChainBlock) -> DateTime<Utc> {
    i64::try_from(block.timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, keccak256};
    use std::str::FromStr;

    fn tx(to: Option<Address>, value: u128) -> ChainTransaction {
        ChainTransaction {
            hash: keccak256("tx-1"),
            from: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            to,
            gas: 21_000,
            gas_price: 1_000_000_000,
            nonce: 3,
            input: Bytes::from_static(&[0xde, 0xad]),
            value: U256::from(value),
        }
    }

    fn receipt(status: bool, created: Option<Address>) -> ChainReceipt {
        ChainReceipt {
            transaction_hash: keccak256("tx-1"),
            block_hash: None,
            block_number: Some(1),
            status,
            contract_address: created,
            logs: Vec::new(),
        }
    }

    #[test]
    fn plain_transfer_detail() {
        let to = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
        let detail = TransactionDetail::new(&tx(Some(to), 2_000_000_000_000_000_000), None);
        assert_eq!(detail.to, TxRecipient::Address(to));
        assert_eq!(detail.value_wei, U256::from(2_000_000_000_000_000_000u128));
        assert_eq!(detail.value_ether, BigDecimal::from_str("2").unwrap());
        assert_eq!(detail.nonce, 3);
        assert_eq!(detail.to.to_string(), "0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
    }

    #[test]
    fn contract_creation_uses_receipt_address() {
        let created = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
        let detail = TransactionDetail::new(&tx(None, 0), Some(&receipt(true, Some(created))));
        assert_eq!(detail.to, TxRecipient::ContractCreation(Some(created)));
        assert_eq!(
            detail.to.to_string(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3 [CONTRACT CREATION]"
        );
    }

    #[test]
    fn receipt_status_labels() {
        assert_eq!(
            ReceiptStatus::from_receipt(&receipt(true, None)).as_str(),
            "SUCCESSFUL"
        );
        assert_eq!(ReceiptStatus::from_receipt(&receipt(false, None)).as_str(), "FAILED");
    }
}
