use alloy::primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Block as returned by the node, with fully hydrated transactions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainBlock {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    pub uncle_hash: B256,
    pub nonce: u64,
    /// Unix seconds
    pub timestamp: u64,
    pub gas_used: u128,
    pub gas_limit: u128,
    pub difficulty: U256,
    pub size: Option<U256>,
    pub transactions: Vec<ChainTransaction>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainTransaction {
    pub hash: B256,
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub gas: u128,
    pub gas_price: u128,
    pub nonce: u64,
    pub input: Bytes,
    pub value: U256,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    pub transaction_hash: B256,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub status: bool,
    pub contract_address: Option<Address>,
    pub logs: Vec<ChainLog>,
}

/// A single event log entry: emitting address, ordered topics and opaque data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl ChainLog {
    pub fn new(address: Address, topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            topics,
            data: data.into(),
        }
    }
}
