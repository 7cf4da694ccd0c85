//! Codec error types.

use thiserror::Error;
use truf_core::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{what} too short: {len} bytes, expected at least {min}")]
    TooShort {
        what: &'static str,
        len: usize,
        min: usize,
    },

    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("action {0} is not a binary action")]
    NotBinaryAction(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CodecError {
    pub(crate) fn malformed(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            what,
            reason: reason.into(),
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
