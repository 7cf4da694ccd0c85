//! Application configuration.

use crate::error::{AppError, AppResult};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use truf_attestation::PollConfig;
use truf_ledger::{HttpLedgerConfig, KeySource};

/// Gateway connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    /// JSON-RPC endpoint of the gateway node.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Single HTTP round trip timeout (ms). Default: 10,000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Delay between transaction status polls (ms). Default: 500.
    #[serde(default = "default_tx_poll_interval_ms")]
    pub tx_poll_interval_ms: u64,
    /// Give up waiting for a transaction after this long (ms). Default: 30,000.
    #[serde(default = "default_tx_wait_timeout_ms")]
    pub tx_wait_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8484/rpc/v1".to_string()
}

fn default_chain_id() -> String {
    "tn-v2".to_string()
}

fn default_namespace() -> String {
    "main".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_tx_poll_interval_ms() -> u64 {
    500
}

fn default_tx_wait_timeout_ms() -> u64 {
    30_000
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            chain_id: default_chain_id(),
            namespace: default_namespace(),
            request_timeout_ms: default_request_timeout_ms(),
            tx_poll_interval_ms: default_tx_poll_interval_ms(),
            tx_wait_timeout_ms: default_tx_wait_timeout_ms(),
        }
    }
}

impl LedgerSection {
    pub fn to_http_config(&self) -> HttpLedgerConfig {
        HttpLedgerConfig {
            endpoint: self.endpoint.clone(),
            chain_id: self.chain_id.clone(),
            namespace: self.namespace.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            tx_poll_interval: Duration::from_millis(self.tx_poll_interval_ms),
            tx_wait_timeout: Duration::from_millis(self.tx_wait_timeout_ms),
        }
    }
}

/// Where the signing key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum KeySourceConfig {
    /// Environment variable holding the hex key (development).
    Env {
        #[serde(default = "default_key_env_var")]
        var_name: String,
    },
    /// File holding the hex key (recommend 0600 permissions).
    File { path: PathBuf },
}

fn default_key_env_var() -> String {
    "TRUF_PRIVATE_KEY".to_string()
}

impl Default for KeySourceConfig {
    fn default() -> Self {
        Self::Env {
            var_name: default_key_env_var(),
        }
    }
}

/// Signing key settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeySection {
    #[serde(flatten)]
    pub source: KeySourceConfig,
    /// Refuse to start if the key derives a different address.
    #[serde(default)]
    pub expected_address: Option<String>,
}

impl KeySection {
    pub fn key_source(&self) -> KeySource {
        match &self.source {
            KeySourceConfig::Env { var_name } => KeySource::EnvVar {
                var_name: var_name.clone(),
            },
            KeySourceConfig::File { path } => KeySource::File { path: path.clone() },
        }
    }

    pub fn expected_address(&self) -> AppResult<Option<Address>> {
        self.expected_address
            .as_deref()
            .map(|addr| {
                Address::from_str(addr)
                    .map_err(|e| AppError::Config(format!("Invalid expected_address: {e}")))
            })
            .transpose()
    }
}

/// Attestation request and polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationSection {
    /// Delay between signature polls (ms). Default: 2,000.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Polls before giving up. Default: 15.
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
    /// Max fee in base units when a request does not name one.
    #[serde(default = "default_max_fee")]
    pub default_max_fee: String,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_poll_max_attempts() -> u32 {
    15
}

fn default_max_fee() -> String {
    // 100 TRUF at 18 decimals
    "100000000000000000000".to_string()
}

impl Default for AttestationSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_poll_max_attempts(),
            default_max_fee: default_max_fee(),
        }
    }
}

impl AttestationSection {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ledger: LedgerSection,
    #[serde(default)]
    pub key: KeySection,
    #[serde(default)]
    pub attestation: AttestationSection,
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &str) -> AppResult<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.ledger.endpoint.trim().is_empty() {
            return Err(AppError::Config("ledger.endpoint cannot be empty".to_string()));
        }
        if self.attestation.max_attempts == 0 {
            return Err(AppError::Config("attestation.max_attempts must be at least 1".to_string()));
        }
        if self.attestation.default_max_fee.is_empty()
            || !self
                .attestation
                .default_max_fee
                .bytes()
                .all(|b| b.is_ascii_digit())
        {
            return Err(AppError::Config(
                "attestation.default_max_fee must be a numeric string".to_string(),
            ));
        }
        self.key.expected_address()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.ledger.endpoint, "http://localhost:8484/rpc/v1");
        assert_eq!(config.ledger.tx_wait_timeout_ms, 30_000);
        assert_eq!(config.attestation.poll_config(), PollConfig::default());
        assert_eq!(
            config.key.source,
            KeySourceConfig::Env {
                var_name: "TRUF_PRIVATE_KEY".to_string()
            }
        );
    }

    #[test]
    fn test_full_file() {
        let config = AppConfig::from_toml(
            r#"
            [ledger]
            endpoint = "https://gateway.testnet.truf.network/rpc/v1"
            chain_id = "tn-testnet"
            request_timeout_ms = 5000

            [key]
            source = "file"
            path = "/etc/truf/key.hex"
            expected_address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"

            [attestation]
            poll_interval_ms = 250
            max_attempts = 4
            default_max_fee = "0"
            "#,
        )
        .unwrap();

        let http = config.ledger.to_http_config();
        assert_eq!(http.chain_id, "tn-testnet");
        assert_eq!(http.namespace, "main");
        assert_eq!(http.request_timeout, Duration::from_secs(5));

        assert!(matches!(
            config.key.key_source(),
            KeySource::File { ref path } if path == &PathBuf::from("/etc/truf/key.hex")
        ));
        assert!(config.key.expected_address().unwrap().is_some());

        let poll = config.attestation.poll_config();
        assert_eq!(poll.interval, Duration::from_millis(250));
        assert_eq!(poll.max_attempts, 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for content in [
            "[attestation]\nmax_attempts = 0",
            "[attestation]\ndefault_max_fee = \"1e18\"",
            "[ledger]\nendpoint = \"\"",
            "[key]\nexpected_address = \"0x1234\"",
            "[key]\nsource = \"vault\"",
        ] {
            let err = AppConfig::from_toml(content).unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "{content}: {err}");
        }
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = AppConfig::load("/nonexistent/truf/config.toml").unwrap();
        assert_eq!(config.attestation.max_attempts, 15);
    }
}
