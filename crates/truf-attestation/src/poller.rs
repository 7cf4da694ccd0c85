//! Bounded polling for a signed attestation.
//!
//! The node signs attestations asynchronously, usually within a few blocks.
//! The poller re-fetches the payload at a fixed interval until it carries a
//! signature or the attempt budget is spent. Nothing runs in the background;
//! dropping the future cancels the wait.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use truf_codec::SIGNATURE_LEN;
use truf_ledger::DynLedgerClient;
use truf_telemetry::Metrics;

use crate::client::{check_request_tx_id, fetch_signed_attestation};
use crate::error::{AttestationError, AttestationResult};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_MAX_ATTEMPTS: u32 = 15;

/// Client-side view of an attestation's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationStatus {
    Pending,
    Signed,
}

impl AttestationStatus {
    /// A payload is signed once it is longer than a bare signature.
    pub fn of_payload(payload: &[u8]) -> Self {
        if payload.len() > SIGNATURE_LEN {
            Self::Signed
        } else {
            Self::Pending
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::Signed)
    }
}

/// Polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(with = "duration_ms", rename = "interval_ms")]
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Waits for a request's payload to be signed.
pub struct AttestationPoller {
    ledger: DynLedgerClient,
    config: PollConfig,
}

impl AttestationPoller {
    pub fn new(ledger: DynLedgerClient, config: PollConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Fetch until signed, at most `max_attempts` times.
    ///
    /// The request id is checked once before polling starts, so a blank id
    /// fails without a ledger call. After that every fetch error counts as
    /// "not ready yet". Returns [`AttestationError::Timeout`] once the budget
    /// is spent.
    pub async fn wait_for_signature(&self, request_tx_id: &str) -> AttestationResult<Vec<u8>> {
        let request_tx_id = check_request_tx_id(request_tx_id)?;
        for attempt in 1..=self.config.max_attempts {
            match fetch_signed_attestation(self.ledger.as_ref(), request_tx_id).await {
                Ok(payload) if AttestationStatus::of_payload(&payload).is_signed() => {
                    Metrics::poll_attempt("signed");
                    info!(
                        request_tx_id,
                        attempt,
                        len = payload.len(),
                        "Attestation signed"
                    );
                    return Ok(payload);
                }
                Ok(payload) => {
                    Metrics::poll_attempt("pending");
                    debug!(
                        request_tx_id,
                        attempt,
                        len = payload.len(),
                        "Attestation not signed yet"
                    );
                }
                Err(err) => {
                    Metrics::poll_attempt("error");
                    debug!(
                        request_tx_id,
                        attempt,
                        error = %err,
                        "Attestation fetch failed, retrying"
                    );
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        warn!(
            request_tx_id,
            attempts = self.config.max_attempts,
            "Gave up waiting for attestation signature"
        );
        Err(AttestationError::Timeout {
            attempts: self.config.max_attempts,
            request_tx_id: request_tx_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use truf_core::CoreError;
    use truf_ledger::{LedgerError, MockLedger, Row};

    const REQUEST: &str = "ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12";

    fn fast(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    fn payload_row(len: usize) -> Row {
        Row::new().with("payload", format!("0x{}", "07".repeat(len)))
    }

    #[test]
    fn test_status_threshold() {
        assert_eq!(
            AttestationStatus::of_payload(&[]),
            AttestationStatus::Pending
        );
        assert_eq!(
            AttestationStatus::of_payload(&[0; 65]),
            AttestationStatus::Pending
        );
        assert!(AttestationStatus::of_payload(&[0; 66]).is_signed());
    }

    #[test]
    fn test_default_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.max_attempts, 15);
    }

    #[tokio::test]
    async fn test_returns_once_signed() {
        let mock = Arc::new(MockLedger::default());
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        mock.set_read_handler("get_signed_attestation", move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            match n {
                0 => Err(LedgerError::NotFound("not indexed".to_string())),
                1 => Ok(vec![payload_row(40)]),
                _ => Ok(vec![payload_row(140)]),
            }
        });

        let poller = AttestationPoller::new(mock, fast(5));
        let payload = poller.wait_for_signature(REQUEST).await.unwrap();
        assert_eq!(payload.len(), 140);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out_after_budget() {
        let mock = Arc::new(MockLedger::default());
        mock.set_read_rows("get_signed_attestation", vec![payload_row(10)]);

        let poller = AttestationPoller::new(mock.clone(), fast(4));
        let err = poller.wait_for_signature(REQUEST).await.unwrap_err();
        assert_eq!(
            err,
            AttestationError::Timeout {
                attempts: 4,
                request_tx_id: REQUEST.to_string(),
            }
        );
        assert_eq!(mock.reads().len(), 4);
    }

    #[tokio::test]
    async fn test_every_fetch_error_is_retried() {
        let mock = Arc::new(MockLedger::default());
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        mock.set_read_handler("get_signed_attestation", move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            match n {
                0 => Err(LedgerError::Http("connection reset".to_string())),
                // undecodable payload column
                1 => Ok(vec![Row::new().with("payload", "0xzz")]),
                2 => Err(CoreError::invalid("request_tx_id", "unknown request").into()),
                _ => Ok(vec![payload_row(70)]),
            }
        });

        let poller = AttestationPoller::new(mock, fast(5));
        let payload = poller.wait_for_signature(REQUEST).await.unwrap();
        assert_eq!(payload.len(), 70);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_blank_id_fails_fast() {
        let mock = Arc::new(MockLedger::default());
        let poller = AttestationPoller::new(mock.clone(), fast(4));
        for blank in ["", "   "] {
            let err = poller.wait_for_signature(blank).await.unwrap_err();
            assert!(matches!(err, AttestationError::Validation(_)));
            assert_eq!(err.to_string(), "request_tx_id cannot be empty");
        }
        assert!(mock.reads().is_empty());
    }
}
