use serde::{Deserialize, Serialize};

use super::Node;
use crate::blockchain::Block;
use crate::transaction::Transaction;

/// Body of `GET /get_chain`, served to peers and decoded from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetChainResponse {
    #[serde(rename = "Numblocks")]
    pub length: usize,
    #[serde(rename = "Blockchain")]
    pub ledger: LedgerSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LedgerSnapshot {
    pub chain: Vec<Block>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub address: String,
}
