//! Attestation list vocabulary.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest page accepted by `list_attestations`.
pub const MAX_ATTESTATION_LIST_LIMIT: u32 = 5000;

/// Requester filters are raw address bytes.
pub const MAX_REQUESTER_LEN: usize = 20;

/// Sort order for attestation listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttestationOrderBy {
    CreatedHeightAsc,
    #[default]
    CreatedHeightDesc,
    SignedHeightAsc,
    SignedHeightDesc,
}

impl AttestationOrderBy {
    pub const ALL: [AttestationOrderBy; 4] = [
        AttestationOrderBy::CreatedHeightAsc,
        AttestationOrderBy::CreatedHeightDesc,
        AttestationOrderBy::SignedHeightAsc,
        AttestationOrderBy::SignedHeightDesc,
    ];

    /// Wire form sent to the node.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedHeightAsc => "created_height asc",
            Self::CreatedHeightDesc => "created_height desc",
            Self::SignedHeightAsc => "signed_height asc",
            Self::SignedHeightDesc => "signed_height desc",
        }
    }
}

impl FromStr for AttestationOrderBy {
    type Err = CoreError;

    /// Case-insensitive; surrounding and repeated whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::invalid(
                    "order_by",
                    "order_by must be one of: created_height asc, created_height desc, \
                     signed_height asc, signed_height desc",
                )
            })
    }
}

impl fmt::Display for AttestationOrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
