//! `truf` command-line client.
//!
//! Wires the TRUF.NETWORK client crates behind one binary:
//! - TOML configuration (gateway, signing key, polling)
//! - clap subcommands for attestations, markets and the transaction ledger
//! - JSON output on stdout, logs on stderr

pub mod app;
pub mod cli;
pub mod config;
pub mod error;

pub use app::{run_offline, Application};
pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
