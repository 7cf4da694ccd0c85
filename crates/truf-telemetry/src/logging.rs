//! Tracing subscriber setup for the `truf` binary.
//!
//! Everything is written to stderr; stdout carries command output only.

use std::str::FromStr;

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format.
const LOG_FORMAT_ENV: &str = "TRUF_LOG_FORMAT";

/// Workspace crates whose level follows the verbosity count.
const TRUF_TARGETS: [&str; 7] = [
    "truf_attestation",
    "truf_cli",
    "truf_codec",
    "truf_core",
    "truf_ledger",
    "truf_market",
    "truf_telemetry",
];

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event.
    #[default]
    Compact,
    /// Multi-line, for reading by eye.
    Pretty,
    /// One JSON object per event, with span context.
    Json,
}

impl LogFormat {
    /// Format named by `TRUF_LOG_FORMAT`, or the default when unset.
    pub fn from_env() -> TelemetryResult<Self> {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> TelemetryResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::LoggingInit(format!(
                "unknown log format '{other}', expected compact, pretty or json"
            ))),
        }
    }
}

/// Filter used when `RUST_LOG` is unset.
///
/// Each `-v` raises the truf crates one level above `warn`; dependencies
/// stay at `warn`.
fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let crates = TRUF_TARGETS.map(|target| format!("{target}={level}"));
    format!("warn,{}", crates.join(","))
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the verbosity-derived filter when set.
pub fn init_tracing(verbosity: u8, format: LogFormat) -> TelemetryResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbosity)))
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
