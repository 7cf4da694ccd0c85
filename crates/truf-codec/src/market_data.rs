//! Market description decoding.

use crate::args::{decode_action_args, ActionArg};
use crate::error::{CodecError, CodecResult};
use crate::query::decode_query_components;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use truf_core::{validate_action_name, MarketType};

/// Argument index of the first threshold: `[data_provider, stream_id, timestamp, ...]`.
const THRESHOLD_ARG_INDEX: usize = 3;

/// What a binary market settles on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketData {
    pub action_id: String,
    #[serde(rename = "type")]
    pub market_type: MarketType,
    /// Original threshold strings: `[value]` for above/below,
    /// `[min, max]` for between, `[target, tolerance]` for equals.
    pub thresholds: Vec<String>,
    pub data_provider: String,
    pub stream_id: String,
}

/// Decode query components into a market description.
///
/// The action must be a registered binary action and the encoded arguments
/// must carry the thresholds that action expects. Text thresholds must parse
/// as decimals; their original spelling is kept.
pub fn decode_market_data(query_components: &[u8]) -> CodecResult<MarketData> {
    let components = decode_query_components(query_components)?;

    let action = validate_action_name(&components.action_id)?;
    let market_type = action
        .market_type()
        .ok_or_else(|| CodecError::NotBinaryAction(components.action_id.clone()))?;

    let args = decode_action_args(&components.action_args)?;
    let wanted = market_type.threshold_count();
    let thresholds = args
        .iter()
        .skip(THRESHOLD_ARG_INDEX)
        .take(wanted)
        .map(threshold)
        .collect::<CodecResult<Vec<_>>>()?;

    if thresholds.len() != wanted {
        return Err(CodecError::malformed(
            "market data",
            format!(
                "{} market needs {wanted} thresholds, found {}",
                market_type,
                thresholds.len()
            ),
        ));
    }

    Ok(MarketData {
        action_id: components.action_id,
        market_type,
        thresholds,
        data_provider: components.data_provider,
        stream_id: components.stream_id,
    })
}

fn threshold(arg: &ActionArg) -> CodecResult<String> {
    let value = arg.as_threshold().ok_or_else(|| {
        CodecError::malformed("market data", format!("threshold is not scalar: {arg:?}"))
    })?;
    if let ActionArg::Text(text) = arg {
        Decimal::from_str(text).map_err(|_| {
            CodecError::malformed("market data", format!("threshold is not a decimal: {text}"))
        })?;
    }
    Ok(value)
}
