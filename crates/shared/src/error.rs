use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed user input; the previous value is kept.
    InvalidInput,
    /// Missing token id or non-positive amount.
    PreconditionNotMet,
    /// Wallet refused, transport failed or the transaction reverted.
    ExternalFailure,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct PaymentError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PaymentError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PreconditionNotMet, message)
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalFailure, message)
    }
}
