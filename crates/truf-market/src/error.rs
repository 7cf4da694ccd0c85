//! Market error types.

use thiserror::Error;
use truf_codec::CodecError;
use truf_core::CoreError;
use truf_ledger::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    /// Rejected locally; never sent to the network.
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl MarketError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
