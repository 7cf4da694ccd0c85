//! Action registry.
//!
//! The set of actions that can be attested is closed: ids 1-5 return
//! time-series rows, ids 6-9 return a single boolean and back binary
//! prediction markets. Unknown names map to id 0 and unknown ids to `""`.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attestable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    GetRecord,
    GetIndex,
    GetChangeOverTime,
    GetLastRecord,
    GetFirstRecord,
    PriceAboveThreshold,
    PriceBelowThreshold,
    ValueInRange,
    ValueEquals,
}

impl Action {
    /// Every registered action, in id order.
    pub const ALL: [Action; 9] = [
        Action::GetRecord,
        Action::GetIndex,
        Action::GetChangeOverTime,
        Action::GetLastRecord,
        Action::GetFirstRecord,
        Action::PriceAboveThreshold,
        Action::PriceBelowThreshold,
        Action::ValueInRange,
        Action::ValueEquals,
    ];

    pub fn id(self) -> u16 {
        match self {
            Self::GetRecord => 1,
            Self::GetIndex => 2,
            Self::GetChangeOverTime => 3,
            Self::GetLastRecord => 4,
            Self::GetFirstRecord => 5,
            Self::PriceAboveThreshold => 6,
            Self::PriceBelowThreshold => 7,
            Self::ValueInRange => 8,
            Self::ValueEquals => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GetRecord => "get_record",
            Self::GetIndex => "get_index",
            Self::GetChangeOverTime => "get_change_over_time",
            Self::GetLastRecord => "get_last_record",
            Self::GetFirstRecord => "get_first_record",
            Self::PriceAboveThreshold => "price_above_threshold",
            Self::PriceBelowThreshold => "price_below_threshold",
            Self::ValueInRange => "value_in_range",
            Self::ValueEquals => "value_equals",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GetRecord => "Time series records for a stream",
            Self::GetIndex => "Index values relative to a base time",
            Self::GetChangeOverTime => "Percentage change over a time window",
            Self::GetLastRecord => "Most recent record",
            Self::GetFirstRecord => "Earliest record",
            Self::PriceAboveThreshold => "TRUE if the value is above a threshold",
            Self::PriceBelowThreshold => "TRUE if the value is below a threshold",
            Self::ValueInRange => "TRUE if the value lies within [min, max]",
            Self::ValueEquals => "TRUE if the value equals a target within tolerance",
        }
    }

    /// Binary actions return a single boolean result.
    pub fn is_binary(self) -> bool {
        self.id() >= 6
    }

    /// Market type settled by this action (binary actions only).
    pub fn market_type(self) -> Option<MarketType> {
        match self {
            Self::PriceAboveThreshold => Some(MarketType::Above),
            Self::PriceBelowThreshold => Some(MarketType::Below),
            Self::ValueInRange => Some(MarketType::Between),
            Self::ValueEquals => Some(MarketType::Equals),
            _ => None,
        }
    }

    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of binary prediction market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Above,
    Below,
    Between,
    Equals,
}

impl MarketType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Between => "between",
            Self::Equals => "equals",
        }
    }

    /// Number of threshold arguments the market query carries.
    pub fn threshold_count(self) -> usize {
        match self {
            Self::Above | Self::Below => 1,
            Self::Between | Self::Equals => 2,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionInfo {
    pub id: u16,
    pub name: &'static str,
    pub is_binary: bool,
    pub description: &'static str,
}

/// Action id for `name`, or 0 if unregistered.
pub fn get_action_id(name: &str) -> u16 {
    Action::from_name(name).map_or(0, Action::id)
}

/// Action name for `id`, or `""` if unregistered.
pub fn get_action_name(id: u16) -> &'static str {
    Action::from_id(id).map_or("", Action::name)
}

pub fn is_binary_action(name: &str) -> bool {
    Action::from_name(name).is_some_and(Action::is_binary)
}

pub fn is_binary_action_id(id: u16) -> bool {
    Action::from_id(id).is_some_and(Action::is_binary)
}

/// Resolve `name` against the registry.
pub fn validate_action_name(name: &str) -> Result<Action> {
    Action::from_name(name).ok_or_else(|| CoreError::UnknownAction(name.to_string()))
}

/// The full registry, in id order.
pub fn action_registry() -> Vec<ActionInfo> {
    Action::ALL
        .into_iter()
        .map(|a| ActionInfo {
            id: a.id(),
            name: a.name(),
            is_binary: a.is_binary(),
            description: a.description(),
        })
        .collect()
}
