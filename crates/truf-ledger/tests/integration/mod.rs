//! Integration tests for truf-ledger.
//!
//! Exercise the HTTP gateway adapter against an in-process JSON-RPC server.

pub mod common;
