//! Ledger collaborator for the TRUF.NETWORK client.
//!
//! Everything above this crate talks to the network through [`LedgerClient`]:
//! submit a signed action, wait for its transaction, call a read-only action,
//! and report the caller's identity. Two adapters are provided:
//! - [`HttpLedger`]: JSON-RPC over HTTP to a gateway node
//! - [`MockLedger`]: scripted in-memory ledger for tests
//!
//! Read results arrive either column-oriented or row-oriented and are
//! normalized once into [`Row`]s at this boundary.

pub mod client;
pub mod error;
pub mod http;
pub mod key;
pub mod mock;
pub mod nonce;
pub mod row;
pub mod transaction;

pub use client::{BoxFuture, DynLedgerClient, LedgerClient, TxHash, TxOutcome, TxStatus};
pub use error::{LedgerError, LedgerResult};
pub use http::{HttpLedger, HttpLedgerConfig};
pub use key::{KeyError, KeyManager, KeySource};
pub use mock::{MockLedger, ReadCall, Submission};
pub use nonce::NonceManager;
pub use row::{normalize_rows, Row};
pub use transaction::{
    FeeDistribution, TransactionEvent, TransactionFeeEntry, TransactionLedger,
    DEFAULT_FEE_LIST_LIMIT,
};
