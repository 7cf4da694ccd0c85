//! Attestation workflow over a ledger.

use tracing::{debug, info};
use truf_codec::ActionArg;
use truf_core::CoreError;
use truf_ledger::{DynLedgerClient, LedgerClient, LedgerError, TxHash};
use truf_telemetry::Metrics;

use crate::error::AttestationResult;
use crate::list::{AttestationRecord, ListAttestationsQuery};
use crate::poller::{AttestationPoller, AttestationStatus, PollConfig};
use crate::request::{AttestationRequest, REQUEST_ATTESTATION_ACTION};

const GET_SIGNED_ATTESTATION_ACTION: &str = "get_signed_attestation";
const LIST_ATTESTATIONS_ACTION: &str = "list_attestations";

/// Trimmed request id; blank ids are rejected.
pub(crate) fn check_request_tx_id(request_tx_id: &str) -> AttestationResult<&str> {
    let request_tx_id = request_tx_id.trim();
    if request_tx_id.is_empty() {
        return Err(CoreError::invalid("request_tx_id", "request_tx_id cannot be empty").into());
    }
    Ok(request_tx_id)
}

/// Read the stored payload for a request. Unsigned requests return the bare
/// canonical payload (or nothing).
pub(crate) async fn fetch_signed_attestation(
    ledger: &dyn LedgerClient,
    request_tx_id: &str,
) -> AttestationResult<Vec<u8>> {
    let request_tx_id = check_request_tx_id(request_tx_id)?;
    let rows = ledger
        .call_read_action(
            GET_SIGNED_ATTESTATION_ACTION,
            vec![ActionArg::text(request_tx_id)],
        )
        .await?;
    let row = rows
        .first()
        .ok_or_else(|| LedgerError::NotFound(format!("attestation {request_tx_id} not found")))?;
    Ok(row.get_opt_bytes("payload")?.unwrap_or_default())
}

/// Attestation client.
pub struct AttestationClient {
    ledger: DynLedgerClient,
    poller: AttestationPoller,
}

impl AttestationClient {
    pub fn new(ledger: DynLedgerClient) -> Self {
        Self::with_poll_config(ledger, PollConfig::default())
    }

    pub fn with_poll_config(ledger: DynLedgerClient, poll: PollConfig) -> Self {
        Self {
            poller: AttestationPoller::new(ledger.clone(), poll),
            ledger,
        }
    }

    /// Validate and submit a request. Returns the request transaction id.
    ///
    /// With `wait`, also waits for the transaction to be final; a failed
    /// execution is an error. Validation failures never reach the network.
    pub async fn request_attestation(
        &self,
        request: &AttestationRequest,
        wait: bool,
    ) -> AttestationResult<TxHash> {
        if let Err(err) = request.validate() {
            Metrics::validation_rejected("request_attestation", err.field().unwrap_or("unknown"));
            return Err(err.into());
        }

        let args = request.to_action_args()?;
        let tx_hash = self.ledger.submit(REQUEST_ATTESTATION_ACTION, args).await?;
        info!(
            tx_hash = %tx_hash,
            data_provider = %request.data_provider,
            stream_id = %request.stream_id,
            action = %request.action_name,
            "Attestation requested"
        );

        if wait {
            let outcome = self.ledger.wait_for_tx(tx_hash.clone()).await?;
            debug!(tx_hash = %tx_hash, height = outcome.height, "Attestation request final");
        }
        Ok(tx_hash)
    }

    /// Current payload for a request; signed once longer than 65 bytes.
    pub async fn get_signed_attestation(&self, request_tx_id: &str) -> AttestationResult<Vec<u8>> {
        fetch_signed_attestation(self.ledger.as_ref(), request_tx_id).await
    }

    pub async fn attestation_status(
        &self,
        request_tx_id: &str,
    ) -> AttestationResult<AttestationStatus> {
        let payload = self.get_signed_attestation(request_tx_id).await?;
        Ok(AttestationStatus::of_payload(&payload))
    }

    /// Poll until the payload is signed. See [`AttestationPoller`].
    pub async fn wait_for_signature(&self, request_tx_id: &str) -> AttestationResult<Vec<u8>> {
        self.poller.wait_for_signature(request_tx_id).await
    }

    /// List attestation metadata.
    ///
    /// Rows come back exactly as the node ordered them; `order_by` is only
    /// validated and forwarded.
    pub async fn list_attestations(
        &self,
        query: &ListAttestationsQuery,
    ) -> AttestationResult<Vec<AttestationRecord>> {
        let order_by = match query.validate() {
            Ok(order_by) => order_by,
            Err(err) => {
                Metrics::validation_rejected("list_attestations", err.field().unwrap_or("unknown"));
                return Err(err.into());
            }
        };

        let rows = self
            .ledger
            .call_read_action(LIST_ATTESTATIONS_ACTION, query.to_action_args(order_by))
            .await?;
        let records = rows
            .iter()
            .map(AttestationRecord::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rows = records.len(), "Listed attestations");
        Ok(records)
    }
}
