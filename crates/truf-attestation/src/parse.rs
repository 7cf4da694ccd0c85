//! Readable views of canonical attestation payloads.

use truf_codec::{BooleanResult, CodecError, ParsedAttestationPayload};

use crate::error::{AttestationError, AttestationResult};

/// Parse a canonical (unsigned) payload.
///
/// Strip the signature first (see [`crate::verify_attestation_signature`]).
/// Any malformed section fails the whole parse; there are no partial results.
pub fn parse_attestation_payload(canonical: &[u8]) -> AttestationResult<ParsedAttestationPayload> {
    if canonical.is_empty() {
        return Err(AttestationError::EmptyPayload);
    }
    truf_codec::parse_attestation_payload(canonical).map_err(parse_error)
}

/// Boolean outcome of a binary action (ids 6-9) payload.
pub fn parse_boolean_result(canonical: &[u8]) -> AttestationResult<BooleanResult> {
    if canonical.is_empty() {
        return Err(AttestationError::EmptyPayload);
    }
    truf_codec::parse_boolean_result(canonical).map_err(|e| match e {
        CodecError::NotBinaryAction(_) => AttestationError::Codec(e),
        other => parse_error(other),
    })
}

fn parse_error(err: CodecError) -> AttestationError {
    AttestationError::Parse(err.to_string())
}
