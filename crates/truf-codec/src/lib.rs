//! Binary codecs for the TRUF.NETWORK client.
//!
//! - `args`: deterministic encoding of ordered action arguments
//! - `query`: ABI-encoded query components identifying a market question
//! - `market_data`: decoding query components back into a market description
//! - `payload`: the canonical attestation payload and its ABI result section

pub mod args;
pub mod error;
pub mod market_data;
pub mod payload;
pub mod query;

pub use args::{decode_action_args, encode_action_args, ActionArg};
pub use error::{CodecError, CodecResult};
pub use market_data::{decode_market_data, MarketData};
pub use payload::{
    decode_boolean_result, decode_record_result, encode_boolean_result, encode_record_result,
    parse_attestation_payload, parse_boolean_result, split_signed_payload, AttestationPayload,
    BooleanResult, ParsedAttestationPayload, ResultRow, ALGORITHM_SECP256K1, PAYLOAD_VERSION,
    SIGNATURE_LEN,
};
pub use query::{decode_query_components, encode_query_components, QueryComponents};
