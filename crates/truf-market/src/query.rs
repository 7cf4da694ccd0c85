//! Query descriptors for the four binary market types.

use std::str::FromStr;

use rust_decimal::Decimal;
use truf_codec::{encode_action_args, encode_query_components, ActionArg};
use truf_core::{parse_data_provider, validate_stream_id, Action, CoreError};

use crate::error::MarketResult;

/// Predicate a binary market settles on. Values are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryCondition {
    /// TRUE if the value exceeds `threshold`.
    PriceAbove { threshold: String },
    /// TRUE if the value is below `threshold`.
    PriceBelow { threshold: String },
    /// TRUE if `min <= value <= max`.
    ValueInRange { min: String, max: String },
    /// TRUE if the value is within `tolerance` of `target`.
    ValueEquals { target: String, tolerance: String },
}

impl BinaryCondition {
    pub fn action(&self) -> Action {
        match self {
            Self::PriceAbove { .. } => Action::PriceAboveThreshold,
            Self::PriceBelow { .. } => Action::PriceBelowThreshold,
            Self::ValueInRange { .. } => Action::ValueInRange,
            Self::ValueEquals { .. } => Action::ValueEquals,
        }
    }

    fn thresholds(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::PriceAbove { threshold } | Self::PriceBelow { threshold } => {
                vec![("threshold", threshold)]
            }
            Self::ValueInRange { min, max } => vec![("min_value", min), ("max_value", max)],
            Self::ValueEquals { target, tolerance } => {
                vec![("target_value", target), ("tolerance", tolerance)]
            }
        }
    }
}

/// Everything needed to describe a binary market's question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMarketQuery {
    pub data_provider: String,
    pub stream_id: String,
    /// Unix timestamp the value is read at.
    pub timestamp: i64,
    pub condition: BinaryCondition,
    /// Freeze the value lookup at this unix timestamp.
    pub frozen_at: Option<i64>,
}

impl BinaryMarketQuery {
    /// Validate and encode as query components.
    ///
    /// Every input is checked before encoding, so a bad locator or threshold
    /// is a validation error rather than a codec error. Arguments are
    /// `[data_provider, stream_id, timestamp, thresholds..., frozen_at]` with
    /// thresholds encoded as numerics.
    pub fn to_query_components(&self) -> MarketResult<Vec<u8>> {
        parse_data_provider(&self.data_provider)?;
        validate_stream_id(&self.stream_id)?;

        let mut args = vec![
            ActionArg::text(&self.data_provider),
            ActionArg::text(&self.stream_id),
            ActionArg::Int(self.timestamp),
        ];
        for (field, value) in self.condition.thresholds() {
            let parsed = Decimal::from_str(value.trim()).map_err(|_| {
                CoreError::invalid(field, format!("{field} must be a decimal number"))
            })?;
            args.push(ActionArg::Numeric(parsed));
        }
        args.push(ActionArg::opt_int(self.frozen_at));

        let encoded = encode_action_args(&args)?;
        Ok(encode_query_components(
            &self.data_provider,
            &self.stream_id,
            self.condition.action().name(),
            &encoded,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truf_codec::decode_market_data;
    use truf_core::MarketType;

    const PROVIDER: &str = "0x4710a8d8f0d845da110086812a32de6d90d7ff5c";
    const STREAM: &str = "stbtcusd000000000000000000000000";

    fn query(condition: BinaryCondition) -> BinaryMarketQuery {
        BinaryMarketQuery {
            data_provider: PROVIDER.to_string(),
            stream_id: STREAM.to_string(),
            timestamp: 1_767_225_600,
            condition,
            frozen_at: None,
        }
    }

    #[test]
    fn test_above_round_trips_through_market_data() {
        let qc = query(BinaryCondition::PriceAbove {
            threshold: "100000".to_string(),
        })
        .to_query_components()
        .unwrap();
        assert!(qc.len() >= 128);

        let data = decode_market_data(&qc).unwrap();
        assert_eq!(data.action_id, "price_above_threshold");
        assert_eq!(data.market_type, MarketType::Above);
        assert_eq!(data.thresholds, vec!["100000"]);
        assert_eq!(data.data_provider, PROVIDER);
        assert_eq!(data.stream_id, STREAM);
    }

    #[test]
    fn test_two_threshold_types() {
        let mut range = query(BinaryCondition::ValueInRange {
            min: "90000".to_string(),
            max: "110000.5".to_string(),
        });
        range.frozen_at = Some(1_767_000_000);
        let data = decode_market_data(&range.to_query_components().unwrap()).unwrap();
        assert_eq!(data.market_type, MarketType::Between);
        assert_eq!(data.thresholds, vec!["90000", "110000.5"]);

        let equals = query(BinaryCondition::ValueEquals {
            target: "5.25".to_string(),
            tolerance: "0.01".to_string(),
        });
        let data = decode_market_data(&equals.to_query_components().unwrap()).unwrap();
        assert_eq!(data.market_type, MarketType::Equals);
        assert_eq!(data.thresholds, vec!["5.25", "0.01"]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let q = query(BinaryCondition::PriceBelow {
            threshold: "4".to_string(),
        });
        assert_eq!(
            q.to_query_components().unwrap(),
            q.to_query_components().unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let mut q = query(BinaryCondition::PriceAbove {
            threshold: "1".to_string(),
        });
        q.data_provider = "0x123".to_string();
        assert_eq!(
            q.to_query_components().unwrap_err().to_string(),
            "data_provider must be 42 characters"
        );

        let mut q = query(BinaryCondition::PriceAbove {
            threshold: "1".to_string(),
        });
        q.data_provider = format!("0x{}", "zz".repeat(20));
        let err = q.to_query_components().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "data_provider must be a valid hex address");

        let mut q = query(BinaryCondition::PriceAbove {
            threshold: "1".to_string(),
        });
        q.stream_id = "st".to_string();
        assert_eq!(
            q.to_query_components().unwrap_err().to_string(),
            "stream_id must be 32 characters"
        );

        let q = query(BinaryCondition::PriceAbove {
            threshold: "lots".to_string(),
        });
        assert_eq!(
            q.to_query_components().unwrap_err().to_string(),
            "threshold must be a decimal number"
        );
    }
}
