//! Ledger error types.

use thiserror::Error;
use truf_codec::CodecError;
use truf_core::CoreError;

/// Node error text that means a batch was too large to price.
const ESTIMATE_PRICE_FAILURE: &str = "failed to estimate price";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Request too large: The batch size exceeds the maximum allowed size")]
    RequestTooLarge,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transaction {tx_hash} failed: {log}")]
    TxFailed { tx_hash: String, log: String },

    #[error("Timed out waiting for transaction {0}")]
    Timeout(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl LedgerError {
    /// Classify an error reported by the node.
    pub fn from_node(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(ESTIMATE_PRICE_FAILURE) {
            Self::RequestTooLarge
        } else if message.to_ascii_lowercase().contains("not found") {
            Self::NotFound(message)
        } else {
            Self::Rpc { code, message }
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
