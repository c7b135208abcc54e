//! Backend commands queued from UI to backend worker.

use shared::{
    domain::TokenId,
    protocol::{TransactionRequest, TxHash},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadLastTokenId,
    PersistTokenId(TokenId),
    ConnectWallet,
    Submit(TransactionRequest),
    PollStatus(TxHash),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadLastTokenId => "load_last_token_id",
            BackendCommand::PersistTokenId(_) => "persist_token_id",
            BackendCommand::ConnectWallet => "connect_wallet",
            BackendCommand::Submit(_) => "submit",
            BackendCommand::PollStatus(_) => "poll_status",
        }
    }
}
