//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key error: {0}")]
    Key(#[from] truf_ledger::KeyError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] truf_ledger::LedgerError),

    #[error("Attestation error: {0}")]
    Attestation(#[from] truf_attestation::AttestationError),

    #[error("Market error: {0}")]
    Market(#[from] truf_market::MarketError),

    #[error("Codec error: {0}")]
    Codec(#[from] truf_codec::CodecError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] truf_telemetry::TelemetryError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
