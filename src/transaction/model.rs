use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One transfer intent. Field order is part of the canonical block encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }

    /// Structural checks applied on submission. Balances are not modelled.
    pub fn check(&self) -> Result<()> {
        if self.sender.is_empty() {
            return Err(Error::InvalidTransaction("sender required"));
        }
        if self.receiver.is_empty() {
            return Err(Error::InvalidTransaction("receiver required"));
        }
        Ok(())
    }
}
