//! Attestation request and its local validation.

use truf_codec::{encode_action_args, ActionArg};
use truf_core::{validate_data_provider, validate_stream_id, CoreError};

use crate::error::AttestationResult;

/// Action that records an attestation request on the ledger.
pub const REQUEST_ATTESTATION_ACTION: &str = "request_attestation";

/// A request for a validator to attest the result of `action_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationRequest {
    pub data_provider: String,
    pub stream_id: String,
    pub action_name: String,
    pub args: Vec<ActionArg>,
    /// Must be false; encrypted signatures are not supported.
    pub encrypt_sig: bool,
    /// Upper bound on the fee, as a non-negative integer string in base units.
    pub max_fee: String,
}

impl AttestationRequest {
    pub fn new(
        data_provider: impl Into<String>,
        stream_id: impl Into<String>,
        action_name: impl Into<String>,
        args: Vec<ActionArg>,
        max_fee: impl Into<String>,
    ) -> Self {
        Self {
            data_provider: data_provider.into(),
            stream_id: stream_id.into(),
            action_name: action_name.into(),
            args,
            encrypt_sig: false,
            max_fee: max_fee.into(),
        }
    }

    /// Check every field. Checks run in a fixed order and the first failure
    /// is reported.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_data_provider(&self.data_provider)?;
        validate_stream_id(&self.stream_id)?;

        if self.action_name.is_empty() {
            return Err(CoreError::invalid("action_name", "action_name cannot be empty"));
        }
        if self.encrypt_sig {
            return Err(CoreError::invalid(
                "encrypt_sig",
                "Signature encryption is not supported in MVP",
            ));
        }
        if self.max_fee.is_empty() || !self.max_fee.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::invalid("max_fee", "max_fee must be a numeric string"));
        }
        Ok(())
    }

    /// Arguments of the `request_attestation` action.
    pub(crate) fn to_action_args(&self) -> AttestationResult<Vec<ActionArg>> {
        Ok(vec![
            ActionArg::text(&self.data_provider),
            ActionArg::text(&self.stream_id),
            ActionArg::text(&self.action_name),
            ActionArg::Bytes(encode_action_args(&self.args)?),
            ActionArg::Bool(self.encrypt_sig),
            ActionArg::text(&self.max_fee),
        ])
    }
}
