//! Query components codec.
//!
//! Query components are the ABI parameter encoding of
//! `(address data_provider, bytes32 stream_id, string action_id, bytes args)`
//! and uniquely describe the question a market settles on.

use crate::error::{CodecError, CodecResult};
use alloy::primitives::{Address, Bytes, B256};
use alloy::sol_types::SolValue;
use serde::Serialize;
use truf_core::{StreamId, StreamLocator, QUERY_COMPONENTS_MIN_LEN};

type QueryTuple = (Address, B256, String, Bytes);

/// Decoded query components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryComponents {
    /// Lowercase `0x`-prefixed address.
    pub data_provider: String,
    pub stream_id: String,
    pub action_id: String,
    /// Encoded action arguments as `0x`-prefixed hex.
    pub args: String,
    #[serde(skip)]
    pub action_args: Vec<u8>,
}

/// Encode query components. Deterministic for equal inputs.
pub fn encode_query_components(
    data_provider: &str,
    stream_id: &str,
    action_id: &str,
    action_args: &[u8],
) -> CodecResult<Vec<u8>> {
    let locator = StreamLocator::new(data_provider, stream_id)?;
    let tuple: QueryTuple = (
        locator.data_provider,
        B256::from(locator.stream_id.to_bytes32()),
        action_id.to_string(),
        Bytes::copy_from_slice(action_args),
    );
    Ok(tuple.abi_encode_params())
}

/// Decode query components, rejecting anything shorter than the 4-word head.
pub fn decode_query_components(bytes: &[u8]) -> CodecResult<QueryComponents> {
    if bytes.len() < QUERY_COMPONENTS_MIN_LEN {
        return Err(CodecError::TooShort {
            what: "query components",
            len: bytes.len(),
            min: QUERY_COMPONENTS_MIN_LEN,
        });
    }

    let (data_provider, stream_id, action_id, action_args) =
        <QueryTuple as SolValue>::abi_decode_params(bytes, true)
            .map_err(|e| CodecError::malformed("query components", e.to_string()))?;

    let stream_id = StreamId::from_bytes32(&stream_id.0)?;

    Ok(QueryComponents {
        data_provider: format!("{data_provider:#x}"),
        stream_id: stream_id.to_string(),
        action_id,
        args: format!("0x{}", hex::encode(&action_args)),
        action_args: action_args.to_vec(),
    })
}
