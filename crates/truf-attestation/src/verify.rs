//! Attestation signature verification.
//!
//! A signed payload is the canonical payload followed by a 65-byte
//! recoverable secp256k1 signature `r || s || v` over
//! `sha256(canonical_payload)`. Both `v ∈ {0, 1}` and the Ethereum form
//! `v ∈ {27, 28}` are accepted.

use alloy::primitives::{PrimitiveSignature, B256, U256};
use alloy::signers::SignerSync;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use truf_codec::{split_signed_payload, SIGNATURE_LEN};
use truf_ledger::KeyManager;
use truf_telemetry::Metrics;

use crate::error::{AttestationError, AttestationResult};

/// Result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedAttestation {
    /// Recovered signer, `0x`-prefixed lowercase hex.
    pub validator_address: String,
    /// The payload with the signature stripped.
    pub canonical_payload: Vec<u8>,
}

fn digest(canonical: &[u8]) -> B256 {
    B256::from_slice(&Sha256::digest(canonical))
}

/// Recover the validator address from a signed payload.
///
/// Fails with [`AttestationError::SignatureTooShort`] below 66 bytes and with
/// [`AttestationError::InvalidSignature`] when recovery fails. Whether the
/// address belongs to an authorized validator is for the caller to decide.
pub fn verify_attestation_signature(signed: &[u8]) -> AttestationResult<VerifiedAttestation> {
    let result = recover(signed);
    Metrics::signature_verified(match &result {
        Ok(_) => "ok",
        Err(AttestationError::SignatureTooShort { .. }) => "too_short",
        Err(_) => "invalid",
    });
    result
}

fn recover(signed: &[u8]) -> AttestationResult<VerifiedAttestation> {
    let (canonical, sig) = split_signed_payload(signed)
        .map_err(|_| AttestationError::SignatureTooShort { len: signed.len() })?;

    let raw_v = sig[SIGNATURE_LEN - 1];
    let v = if raw_v >= 27 { raw_v - 27 } else { raw_v };
    if v > 1 {
        return Err(AttestationError::InvalidSignature(format!("invalid recovery id {raw_v}")));
    }

    let signature = PrimitiveSignature::new(
        U256::from_be_slice(&sig[..32]),
        U256::from_be_slice(&sig[32..64]),
        v == 1,
    );
    let address = signature
        .recover_address_from_prehash(&digest(canonical))
        .map_err(|e| AttestationError::InvalidSignature(e.to_string()))?;

    let validator_address = format!("{address:#x}");
    debug!(validator = %validator_address, len = signed.len(), "Attestation signature recovered");

    Ok(VerifiedAttestation {
        validator_address,
        canonical_payload: canonical.to_vec(),
    })
}

/// Sign a canonical payload the way a validator does, returning the signed
/// form (`v` in Ethereum form).
pub fn sign_attestation_payload(canonical: &[u8], keys: &KeyManager) -> AttestationResult<Vec<u8>> {
    let signature = keys
        .signer()
        .sign_hash_sync(&digest(canonical))
        .map_err(|e| AttestationError::InvalidSignature(e.to_string()))?;

    let mut signed = Vec::with_capacity(canonical.len() + SIGNATURE_LEN);
    signed.extend_from_slice(canonical);
    signed.extend_from_slice(&signature.as_bytes());
    Ok(signed)
}
