//! Ledger client trait.
//!
//! Abstracts the node so the attestation and order book clients can be
//! driven by a real gateway or a scripted mock.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use truf_codec::ActionArg;
use truf_core::CoreError;

use crate::error::LedgerResult;
use crate::row::Row;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Transaction hash: 64 lowercase hex characters, no `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    /// Parse a hash, accepting an optional `0x` prefix and any case.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        let bare = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if bare.len() != 64 || !bare.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::invalid("tx_hash", "tx_hash must be 64 hex characters"));
        }
        Ok(Self(bare.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TxHash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TxHash> for String {
    fn from(value: TxHash) -> Self {
        value.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
}

/// Result of waiting for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub height: i64,
    pub status: TxStatus,
    pub log: String,
}

/// Ledger collaborator.
///
/// `submit` returns as soon as the node accepts the transaction; callers that
/// need the effect applied must `wait_for_tx`. Submitting several actions
/// back-to-back without waiting relies on the adapter's nonce tracking and is
/// not safe across processes sharing a key; prefer `submit_batch`.
pub trait LedgerClient: Send + Sync {
    /// Sign and broadcast one action invocation.
    fn submit<'a>(
        &'a self,
        action: &'a str,
        args: Vec<ActionArg>,
    ) -> BoxFuture<'a, LedgerResult<TxHash>>;

    /// Sign and broadcast several invocations of one action in a single
    /// transaction.
    fn submit_batch<'a>(
        &'a self,
        action: &'a str,
        batch: Vec<Vec<ActionArg>>,
    ) -> BoxFuture<'a, LedgerResult<TxHash>>;

    /// Wait until the transaction is final. A failed execution is an error.
    fn wait_for_tx(&self, tx_hash: TxHash) -> BoxFuture<'_, LedgerResult<TxOutcome>>;

    /// Call a read-only action.
    fn call_read_action<'a>(
        &'a self,
        action: &'a str,
        args: Vec<ActionArg>,
    ) -> BoxFuture<'a, LedgerResult<Vec<Row>>>;

    /// Address of the signing identity.
    fn current_account(&self) -> Address;
}

/// Arc wrapper for LedgerClient trait objects.
pub type DynLedgerClient = Arc<dyn LedgerClient>;
