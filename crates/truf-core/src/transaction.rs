//! Transaction ledger vocabulary.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest page accepted by `list_transaction_fees`.
pub const MAX_FEE_LIST_LIMIT: u32 = 1000;

/// Which side of a fee a wallet appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeMode {
    #[default]
    Paid,
    Received,
    Both,
}

impl FeeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Received => "received",
            Self::Both => "both",
        }
    }
}

impl FromStr for FeeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(Self::Paid),
            "received" => Ok(Self::Received),
            "both" => Ok(Self::Both),
            _ => Err(CoreError::invalid("mode", "mode must be one of: paid, received, both")),
        }
    }
}

impl fmt::Display for FeeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
