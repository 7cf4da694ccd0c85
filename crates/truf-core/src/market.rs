//! Market vocabulary and lifecycle.

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum size of ABI-encoded query components (4 head words).
pub const QUERY_COMPONENTS_MIN_LEN: usize = 128;

/// Query hashes are sha256 digests.
pub const QUERY_HASH_LEN: usize = 32;

/// Allowed range for a market's `max_spread`, in cents.
pub const MIN_MAX_SPREAD: i32 = 1;
pub const MAX_MAX_SPREAD: i32 = 50;

/// Settlement bridge. The allow-list is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bridge {
    HoodiTt2,
    SepoliaBridge,
    EthereumBridge,
}

impl Bridge {
    pub const ALL: [Bridge; 3] = [
        Bridge::HoodiTt2,
        Bridge::SepoliaBridge,
        Bridge::EthereumBridge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HoodiTt2 => "hoodi_tt2",
            Self::SepoliaBridge => "sepolia_bridge",
            Self::EthereumBridge => "ethereum_bridge",
        }
    }
}

impl FromStr for Bridge {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| {
                CoreError::invalid(
                    "bridge",
                    "bridge must be one of: hoodi_tt2, sepolia_bridge, ethereum_bridge",
                )
            })
    }
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market lifecycle as observed by the client.
///
/// The node owns the transition to `Settled`; the client only derives the
/// current state from `settled` and `settle_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketState {
    Open,
    Settling,
    Settled,
}

impl MarketState {
    /// Derive the state at `now` for a market with the given fields.
    pub fn derive(settled: bool, settle_time: i64, now: DateTime<Utc>) -> Self {
        if settled {
            Self::Settled
        } else if now.timestamp() >= settle_time {
            Self::Settling
        } else {
            Self::Open
        }
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Settling => write!(f, "settling"),
            Self::Settled => write!(f, "settled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bridge_allow_list() {
        assert_eq!("hoodi_tt2".parse::<Bridge>().unwrap(), Bridge::HoodiTt2);
        assert_eq!(
            "ethereum_bridge".parse::<Bridge>().unwrap(),
            Bridge::EthereumBridge
        );
        let err = "polygon".parse::<Bridge>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "bridge must be one of: hoodi_tt2, sepolia_bridge, ethereum_bridge"
        );
        // case-sensitive wire vocabulary
        assert!("HOODI_TT2".parse::<Bridge>().is_err());
    }

    #[test]
    fn test_market_state_derivation() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(
            MarketState::derive(false, 1_700_000_100, now),
            MarketState::Open
        );
        assert_eq!(
            MarketState::derive(false, 1_700_000_000, now),
            MarketState::Settling
        );
        assert_eq!(
            MarketState::derive(true, 1_700_000_100, now),
            MarketState::Settled
        );
    }
}
