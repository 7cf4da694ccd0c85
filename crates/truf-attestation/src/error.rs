//! Attestation error types.

use thiserror::Error;
use truf_codec::CodecError;
use truf_core::CoreError;
use truf_ledger::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttestationError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Payload cannot be empty")]
    EmptyPayload,

    #[error("Failed to parse attestation payload: {0}")]
    Parse(String),

    #[error(
        "Payload too short ({len} bytes), expected at least 66 \
         (minimum 1 byte data + 65 bytes signature)"
    )]
    SignatureTooShort { len: usize },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Attestation {request_tx_id} not signed after {attempts} attempts")]
    Timeout {
        attempts: u32,
        request_tx_id: String,
    },
}

impl AttestationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type AttestationResult<T> = Result<T, AttestationError>;
