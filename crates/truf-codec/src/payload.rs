//! Canonical attestation payload.
//!
//! Layout (integers big-endian):
//!
//! | field         | encoding                         |
//! |---------------|----------------------------------|
//! | version       | u8                               |
//! | algorithm     | u8 (0 = secp256k1)               |
//! | block_height  | u64                              |
//! | data_provider | u32 length + 20 bytes            |
//! | stream_id     | u32 length + 32 bytes            |
//! | action_id     | u16                              |
//! | arguments     | u32 length + encoded action args |
//! | result        | u32 length + ABI-encoded result  |
//!
//! A signed payload appends a 65-byte `r || s || v` signature.
//!
//! Scalar actions (ids 1-5) carry `(uint256[] timestamps, int256[] values)`
//! with values in 18-decimal fixed point. Binary actions (ids 6-9) carry a
//! single ABI `bool`.

use crate::args::{decode_action_args, put_prefixed, ByteReader};
use crate::error::{CodecError, CodecResult};
use alloy::primitives::{Address, I256, U256};
use alloy::sol_types::SolValue;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use truf_core::{Action, StreamId};

/// Current payload version.
pub const PAYLOAD_VERSION: u8 = 1;

/// Signature algorithm tag for recoverable secp256k1.
pub const ALGORITHM_SECP256K1: u8 = 0;

/// Length of the trailing `r || s || v` signature.
pub const SIGNATURE_LEN: usize = 65;

const FIXED_POINT_DECIMALS: usize = 18;

/// Unsigned payload fields, with arguments and result still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationPayload {
    pub version: u8,
    pub algorithm: u8,
    pub block_height: u64,
    pub data_provider: Address,
    pub stream_id: StreamId,
    pub action_id: u16,
    pub args: Vec<u8>,
    pub result: Vec<u8>,
}

impl AttestationPayload {
    /// Serialize to canonical bytes.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut out = Vec::with_capacity(80 + self.args.len() + self.result.len());
        out.push(self.version);
        out.push(self.algorithm);
        out.extend_from_slice(&self.block_height.to_be_bytes());
        put_prefixed(&mut out, self.data_provider.as_slice())?;
        put_prefixed(&mut out, self.stream_id.as_str().as_bytes())?;
        out.extend_from_slice(&self.action_id.to_be_bytes());
        put_prefixed(&mut out, &self.args)?;
        put_prefixed(&mut out, &self.result)?;
        Ok(out)
    }

    /// Parse canonical bytes. Every field must be present and well-formed.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        const WHAT: &str = "attestation payload";

        let mut reader = ByteReader::new(bytes, WHAT);
        let version = reader.u8()?;
        let algorithm = reader.u8()?;
        let block_height = reader.u64()?;

        let provider = reader.prefixed()?;
        if provider.len() != 20 {
            return Err(CodecError::malformed(
                WHAT,
                format!("data_provider is {} bytes, expected 20", provider.len()),
            ));
        }
        let data_provider = Address::from_slice(provider);

        let stream = reader.prefixed()?;
        let stream: &[u8; 32] = stream.try_into().map_err(|_| {
            CodecError::malformed(
                WHAT,
                format!("stream_id is {} bytes, expected 32", stream.len()),
            )
        })?;
        let stream_id = StreamId::from_bytes32(stream)?;

        let action_id = reader.u16()?;
        let args = reader.prefixed()?.to_vec();
        let result = reader.prefixed()?.to_vec();
        reader.finish()?;

        Ok(Self {
            version,
            algorithm,
            block_height,
            data_provider,
            stream_id,
            action_id,
            args,
            result,
        })
    }
}

/// One result row. Scalar actions yield `[timestamp, value]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub values: Vec<String>,
}

/// Human-readable view of a canonical payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedAttestationPayload {
    pub version: u8,
    pub algorithm: u8,
    pub block_height: u64,
    pub data_provider: String,
    pub stream_id: String,
    pub action_id: u16,
    pub arguments: Vec<Value>,
    pub result: Vec<ResultRow>,
}

/// Decoded result of a binary action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BooleanResult {
    pub result: bool,
    pub action_id: u16,
}

/// Parse a canonical (unsigned) payload into its readable form.
///
/// Fails closed: any malformed section fails the whole parse.
pub fn parse_attestation_payload(canonical: &[u8]) -> CodecResult<ParsedAttestationPayload> {
    let payload = AttestationPayload::decode(canonical)?;

    let arguments = if payload.args.is_empty() {
        Vec::new()
    } else {
        decode_action_args(&payload.args)?
            .iter()
            .map(|arg| arg.to_json())
            .collect()
    };

    let action = Action::from_id(payload.action_id).ok_or_else(|| {
        CodecError::malformed(
            "attestation payload",
            format!("unknown action id {}", payload.action_id),
        )
    })?;

    let result = if payload.result.is_empty() {
        Vec::new()
    } else if action.is_binary() {
        vec![ResultRow {
            values: vec![decode_boolean_result(&payload.result)?.to_string()],
        }]
    } else {
        decode_record_result(&payload.result)?
    };

    Ok(ParsedAttestationPayload {
        version: payload.version,
        algorithm: payload.algorithm,
        block_height: payload.block_height,
        data_provider: format!("{:#x}", payload.data_provider),
        stream_id: payload.stream_id.to_string(),
        action_id: payload.action_id,
        arguments,
        result,
    })
}

/// Extract the boolean result of a binary action payload.
pub fn parse_boolean_result(canonical: &[u8]) -> CodecResult<BooleanResult> {
    let payload = AttestationPayload::decode(canonical)?;
    if !truf_core::is_binary_action_id(payload.action_id) {
        return Err(CodecError::NotBinaryAction(payload.action_id.to_string()));
    }
    Ok(BooleanResult {
        result: decode_boolean_result(&payload.result)?,
        action_id: payload.action_id,
    })
}

/// Split a signed payload into `(canonical, signature)`.
///
/// Requires at least one byte of canonical data.
pub fn split_signed_payload(signed: &[u8]) -> CodecResult<(&[u8], &[u8])> {
    let min = SIGNATURE_LEN + 1;
    if signed.len() < min {
        return Err(CodecError::TooShort {
            what: "signed payload",
            len: signed.len(),
            min,
        });
    }
    Ok(signed.split_at(signed.len() - SIGNATURE_LEN))
}

/// ABI-encode time-series rows as `(uint256[], int256[])`.
pub fn encode_record_result(rows: &[(u64, Decimal)]) -> CodecResult<Vec<u8>> {
    let timestamps: Vec<U256> = rows.iter().map(|(ts, _)| U256::from(*ts)).collect();
    let values = rows
        .iter()
        .map(|(_, value)| to_fixed_point(*value))
        .collect::<CodecResult<Vec<I256>>>()?;
    Ok((timestamps, values).abi_encode_params())
}

/// Decode `(uint256[], int256[])` into `[timestamp, value]` rows.
pub fn decode_record_result(bytes: &[u8]) -> CodecResult<Vec<ResultRow>> {
    let (timestamps, values) = <(Vec<U256>, Vec<I256>) as SolValue>::abi_decode_params(bytes, true)
        .map_err(|e| CodecError::malformed("record result", e.to_string()))?;

    if timestamps.len() != values.len() {
        return Err(CodecError::malformed(
            "record result",
            format!(
                "{} timestamps but {} values",
                timestamps.len(),
                values.len()
            ),
        ));
    }

    Ok(timestamps
        .into_iter()
        .zip(values)
        .map(|(ts, value)| ResultRow {
            values: vec![ts.to_string(), format_fixed_point(value)],
        })
        .collect())
}

pub fn encode_boolean_result(value: bool) -> Vec<u8> {
    value.abi_encode()
}

pub fn decode_boolean_result(bytes: &[u8]) -> CodecResult<bool> {
    <bool as SolValue>::abi_decode(bytes, true)
        .map_err(|e| CodecError::malformed("boolean result", e.to_string()))
}

fn to_fixed_point(value: Decimal) -> CodecResult<I256> {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if frac.len() > FIXED_POINT_DECIMALS {
        return Err(CodecError::malformed(
            "record result",
            format!("{text} has more than {FIXED_POINT_DECIMALS} decimals"),
        ));
    }
    let scaled = format!(
        "{sign}{int_part}{frac:0<width$}",
        width = FIXED_POINT_DECIMALS
    );
    I256::from_dec_str(&scaled)
        .map_err(|e| CodecError::malformed("record result", format!("{text}: {e}")))
}

/// Render an 18-decimal fixed-point value, trimming trailing zeros but
/// keeping at least one fractional digit (`100.5`, `102.0`).
fn format_fixed_point(value: I256) -> String {
    let sign = if value.is_negative() { "-" } else { "" };
    let digits = format!(
        "{:0>width$}",
        value.unsigned_abs().to_string(),
        width = FIXED_POINT_DECIMALS + 1
    );
    let (int_part, frac) = digits.split_at(digits.len() - FIXED_POINT_DECIMALS);
    let frac = frac.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };
    format!("{sign}{int_part}.{frac}")
}
