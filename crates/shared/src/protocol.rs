use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Request handed to the wallet collaborator for signing and broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Bytes,
}

pub type TxHash = B256;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Idle,
    Pending(TxHash),
    Confirmed(TxHash),
    Failed(String),
}

impl TransactionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::Pending(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Confirmed(_) | TransactionStatus::Failed(_)
        )
    }

    pub fn hash(&self) -> Option<TxHash> {
        match self {
            TransactionStatus::Pending(hash) | TransactionStatus::Confirmed(hash) => Some(*hash),
            TransactionStatus::Idle | TransactionStatus::Failed(_) => None,
        }
    }
}
