//! Error types for the Djed client.
//!
//! Every library operation returns [`Result`]. Nothing is recovered
//! locally: errors propagate to the caller (CLI or monitor loop),
//! which decides how to render them.

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::domain::coin::TradeKind;

#[derive(Error, Debug)]
pub enum DjedError {
    /// No wallet endpoint configured, or it did not answer.
    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// A chain read failed, including reverted contract calls.
    #[error("chain read `{method}` failed: {reason}")]
    RpcRead { method: String, reason: String },

    /// A read returned data that does not match the expected ABI type.
    #[error("failed to decode result of `{method}`: {reason}")]
    Decode { method: String, reason: String },

    /// A transaction was attempted with zero connected accounts.
    #[error("no wallet account connected")]
    NoAccountConnected,

    /// The wallet refused the request (user rejection, insufficient funds, node rejection).
    #[error("wallet rejected the request: {0}")]
    WalletRequestRejected(String),

    #[error("invalid amount `{input}`: {reason}")]
    InvalidAmount { input: String, reason: &'static str },

    #[error("invalid endpoint URL `{url}`")]
    InvalidEndpoint { url: String },

    #[error("connected to chain {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The single receipt check after the confirmation delay found nothing.
    #[error("receipt for {hash} not available after {waited_ms} ms")]
    ReceiptUnavailable { hash: TxHash, waited_ms: u64 },

    #[error("{kind} of {amount} is not allowed by the protocol")]
    TradeNotAllowed { kind: TradeKind, amount: String },
}

impl DjedError {
    /// Build an [`DjedError::RpcRead`] from any displayable transport error.
    pub fn rpc(method: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::RpcRead {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    /// Re-label a read failure with the contract method that caused it.
    #[must_use]
    pub fn with_method(self, method: &str) -> Self {
        match self {
            Self::RpcRead { reason, .. } => Self::RpcRead {
                method: method.to_string(),
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DjedError>;
