use serde::{Deserialize, Serialize};

use crate::blockchain::Block;
use crate::network::Node;

/* ---------- Transaction API Models ---------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewTxRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewTxResponse {
    pub message: String,
    pub block_index: u64,
}

/* ---------- Chain API Models ---------- */

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MineResponse {
    pub message: String,
    pub block: Block,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidateResponse {
    pub is_valid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplaceResponse {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/* ---------- Node API Models ---------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectRequest {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectResponse {
    pub message: String,
    pub total_nodes: usize,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
