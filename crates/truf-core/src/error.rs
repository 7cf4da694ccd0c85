//! Error types for truf-core.

use thiserror::Error;

/// Core error types.
///
/// `Validation` messages name the offending field and are surfaced to callers
/// verbatim, so their wording is part of the public contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl CoreError {
    /// Build a validation error for `field`.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Field that failed validation, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::UnknownAction(_) => Some("action_name"),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
