//! Prometheus metrics and structured logging for the TRUF.NETWORK client.
//!
//! - Prometheus counters for ledger calls, local validation rejections and
//!   attestation polling
//! - Tracing subscriber for the CLI: stderr output, level from `-v` or
//!   `RUST_LOG`, layout from `TRUF_LOG_FORMAT`

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_tracing, LogFormat};
pub use metrics::{gather_text, Metrics};
