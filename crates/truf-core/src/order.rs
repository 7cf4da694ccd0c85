//! Order-related types.
//!
//! Prices are signed integer cents. The sign carries the order kind:
//! negative is a bid (buy), positive is an ask (sell), zero is a holding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest tradeable price in cents.
pub const MIN_PRICE_CENTS: i32 = 1;

/// Highest tradeable price in cents.
pub const MAX_PRICE_CENTS: i32 = 99;

/// YES and NO prices of a fully collateralized pair sum to this.
pub const PRICE_SUM_CENTS: i32 = 100;

/// Binary market outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    pub fn from_bool(outcome: bool) -> Self {
        if outcome {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn as_bool(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// Order classification derived from the price sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Holding,
    Buy,
    Sell,
}

impl OrderKind {
    pub fn from_price(price: i32) -> Self {
        match price {
            0 => Self::Holding,
            p if p < 0 => Self::Buy,
            _ => Self::Sell,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Holding => "holding",
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_kind_from_sign() {
        assert_eq!(OrderKind::from_price(0), OrderKind::Holding);
        assert_eq!(OrderKind::from_price(-1), OrderKind::Buy);
        assert_eq!(OrderKind::from_price(-99), OrderKind::Buy);
        assert_eq!(OrderKind::from_price(1), OrderKind::Sell);
        assert_eq!(OrderKind::from_price(99), OrderKind::Sell);
    }

    #[test]
    fn test_outcome_bool_mapping() {
        assert_eq!(Outcome::from_bool(true), Outcome::Yes);
        assert!(!Outcome::No.as_bool());
        assert_eq!(Outcome::No.to_string(), "NO");
    }
}
