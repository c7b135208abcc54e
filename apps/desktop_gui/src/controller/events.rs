//! UI/backend events, widget actions and error modeling for the desktop controller.

use alloy_primitives::Address;
use shared::{
    domain::TokenId,
    protocol::{TransactionStatus, TxHash},
};

/// Backend -> UI.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    LastTokenIdLoaded(Option<TokenId>),
    WalletConnected(Address),
    TransactionSubmitted(TxHash),
    TransactionStatusChanged(TransactionStatus),
    Error(UiError),
}

/// Widget -> controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    TokenInputChanged(String),
    Advance,
    Retreat,
    TogglePreset(u64),
    AmountInputChanged(String),
    ConnectWallet,
    Submit,
    OpenSlides,
    CloseSlides,
    PollTick,
    DismissError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Rejected,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Connect,
    Submit,
    Status,
    Storage,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("rejected")
            || message_lower.contains("denied")
            || message_lower.contains("4001")
            || message_lower.contains("reverted")
        {
            UiErrorCategory::Rejected
        } else if message_lower.contains("invalid")
            || message_lower.contains("required")
            || message_lower.contains("not connected")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnected")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// The user can fix these by reconnecting the wallet and trying again.
    pub fn requires_reconnect(&self) -> bool {
        self.context == UiErrorContext::Connect || self.message.contains("not connected")
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn label(&self) -> &'static str {
        match self.category {
            UiErrorCategory::Rejected => "Rejected",
            UiErrorCategory::Transport => "Wallet unreachable",
            UiErrorCategory::Validation => "Check input",
            UiErrorCategory::Unknown => "Unexpected",
        }
    }
}
