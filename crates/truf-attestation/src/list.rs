//! Attestation metadata listing.

use serde::Serialize;
use truf_codec::ActionArg;
use truf_core::{AttestationOrderBy, CoreError, MAX_ATTESTATION_LIST_LIMIT, MAX_REQUESTER_LEN};
use truf_ledger::{LedgerResult, Row};

/// Filters and paging for `list_attestations`. Unset fields use the node's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAttestationsQuery {
    /// Requester address bytes. Pass the full 20-byte address; shorter values
    /// are forwarded verbatim and matched however the node matches them.
    pub requester: Option<Vec<u8>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Parsed case-insensitively, e.g. `"created_height desc"`.
    pub order_by: Option<String>,
}

impl ListAttestationsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requester(mut self, requester: impl Into<Vec<u8>>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Validate and return the parsed ordering, if one was given.
    pub fn validate(&self) -> Result<Option<AttestationOrderBy>, CoreError> {
        if let Some(requester) = &self.requester {
            if requester.len() > MAX_REQUESTER_LEN {
                return Err(CoreError::invalid("requester", "requester must be at most 20 bytes"));
            }
        }
        if let Some(limit) = self.limit {
            if !(1..=i64::from(MAX_ATTESTATION_LIST_LIMIT)).contains(&limit) {
                return Err(CoreError::invalid("limit", "limit must be between 1 and 5000"));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(CoreError::invalid("offset", "offset must be non-negative"));
            }
        }
        self.order_by
            .as_deref()
            .map(str::parse::<AttestationOrderBy>)
            .transpose()
    }

    pub(crate) fn to_action_args(&self, order_by: Option<AttestationOrderBy>) -> Vec<ActionArg> {
        vec![
            self.requester
                .clone()
                .map_or(ActionArg::Null, ActionArg::Bytes),
            ActionArg::opt_int(self.limit),
            ActionArg::opt_int(self.offset),
            ActionArg::opt_text(order_by.map(AttestationOrderBy::as_str)),
        ]
    }
}

/// Metadata of one attestation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttestationRecord {
    pub request_tx_id: String,
    /// `0x`-prefixed hex.
    pub attestation_hash: String,
    /// `0x`-prefixed hex.
    pub requester: String,
    pub created_height: i64,
    /// `None` until a validator signs.
    pub signed_height: Option<i64>,
    pub encrypt_sig: bool,
}

impl AttestationRecord {
    pub(crate) fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            request_tx_id: row.get_string("request_tx_id")?,
            attestation_hash: row.get_hex("attestation_hash")?,
            requester: row.get_hex("requester")?,
            created_height: row.get_i64("created_height")?,
            signed_height: row.get_opt_i64("signed_height")?,
            encrypt_sig: row.get_opt_bool("encrypt_sig")?.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(query: ListAttestationsQuery) -> String {
        query.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_limit_boundaries() {
        for bad in [0, -1, 5001] {
            assert_eq!(
                message(ListAttestationsQuery::new().limit(bad)),
                "limit must be between 1 and 5000"
            );
        }
        for good in [1, 5000] {
            assert!(ListAttestationsQuery::new().limit(good).validate().is_ok());
        }
    }

    #[test]
    fn test_offset_and_requester() {
        assert_eq!(
            message(ListAttestationsQuery::new().offset(-1)),
            "offset must be non-negative"
        );
        assert!(ListAttestationsQuery::new().offset(0).validate().is_ok());

        assert_eq!(
            message(ListAttestationsQuery::new().requester(vec![0u8; 21])),
            "requester must be at most 20 bytes"
        );
        assert!(ListAttestationsQuery::new()
            .requester(vec![0u8; 20])
            .validate()
            .is_ok());
        assert!(ListAttestationsQuery::new()
            .requester(vec![0u8; 8])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_order_by_parsing() {
        for value in [
            "created_height asc",
            "created_height desc",
            "signed_height asc",
            "signed_height desc",
            "CREATED_HEIGHT DESC",
            "Signed_Height Asc",
        ] {
            assert!(
                ListAttestationsQuery::new()
                    .order_by(value)
                    .validate()
                    .unwrap()
                    .is_some(),
                "{value}"
            );
        }
        let msg = message(ListAttestationsQuery::new().order_by("invalid_field asc"));
        assert!(msg.starts_with("order_by must be one of"));
    }

    #[test]
    fn test_defaults_send_nulls() {
        let query = ListAttestationsQuery::new();
        let order = query.validate().unwrap();
        assert_eq!(order, None);
        let args = query.to_action_args(order);
        assert!(args.iter().all(ActionArg::is_null));
    }
}
