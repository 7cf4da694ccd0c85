//! Transaction ledger reads: fee-bearing transaction lookup and fee history.

use serde::Serialize;
use tracing::debug;
use truf_codec::ActionArg;
use truf_core::{CoreError, FeeMode, MAX_FEE_LIST_LIMIT};

use crate::client::DynLedgerClient;
use crate::error::{LedgerError, LedgerResult};
use crate::row::Row;

/// Page size when the caller does not pass one.
pub const DEFAULT_FEE_LIST_LIMIT: u32 = 20;

/// One recipient's share of a transaction fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeDistribution {
    pub recipient: String,
    pub amount: String,
}

/// A recorded transaction with its fee breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionEvent {
    pub tx_id: String,
    pub block_height: i64,
    pub method: String,
    pub caller: String,
    /// Fee in base units, as the node's decimal string.
    pub fee_amount: String,
    pub fee_recipient: Option<String>,
    pub metadata: Option<String>,
    pub fee_distributions: Vec<FeeDistribution>,
}

/// One row of a wallet's fee history. A transaction with several
/// distributions appears once per distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionFeeEntry {
    pub tx_id: String,
    pub block_height: i64,
    pub method: String,
    pub caller: String,
    pub total_fee: String,
    pub fee_recipient: Option<String>,
    pub metadata: Option<String>,
    pub distribution_sequence: i64,
    pub distribution_recipient: Option<String>,
    pub distribution_amount: Option<String>,
}

impl TransactionFeeEntry {
    fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            tx_id: row.get_string("tx_id")?,
            block_height: row.get_i64("block_height")?,
            method: row.get_string("method")?,
            caller: row.get_string("caller")?,
            total_fee: row.get_string("total_fee")?,
            fee_recipient: row.get_opt_string("fee_recipient")?,
            metadata: row.get_opt_string("metadata")?,
            distribution_sequence: row.get_opt_i64("distribution_sequence")?.unwrap_or(0),
            distribution_recipient: row.get_opt_string("distribution_recipient")?,
            distribution_amount: row.get_opt_string("distribution_amount")?,
        })
    }
}

/// Read access to the transaction ledger.
pub struct TransactionLedger {
    ledger: DynLedgerClient,
}

impl TransactionLedger {
    pub fn new(ledger: DynLedgerClient) -> Self {
        Self { ledger }
    }

    /// Look up a transaction. The `0x` prefix is optional.
    pub async fn get_transaction_event(&self, tx_id: &str) -> LedgerResult<TransactionEvent> {
        let trimmed = tx_id.trim();
        let bare = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if bare.is_empty() {
            return Err(CoreError::invalid("tx_id", "tx_id is required").into());
        }
        let normalized = bare.to_ascii_lowercase();

        let rows = self
            .ledger
            .call_read_action(
                "get_transaction_event",
                vec![ActionArg::Text(format!("0x{normalized}"))],
            )
            .await?;

        let first = rows
            .first()
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {normalized} not found")))?;

        let mut fee_distributions = Vec::new();
        for row in &rows {
            if let (Some(recipient), Some(amount)) = (
                row.get_opt_string("distribution_recipient")?,
                row.get_opt_string("distribution_amount")?,
            ) {
                fee_distributions.push(FeeDistribution { recipient, amount });
            }
        }

        Ok(TransactionEvent {
            tx_id: first.get_string("tx_id")?,
            block_height: first.get_i64("block_height")?,
            method: first.get_string("method")?,
            caller: first.get_string("caller")?,
            fee_amount: first.get_string("fee_amount")?,
            fee_recipient: first.get_opt_string("fee_recipient")?,
            metadata: first.get_opt_string("metadata")?,
            fee_distributions,
        })
    }

    /// Fee history for `wallet`, newest first as returned by the node.
    pub async fn list_transaction_fees(
        &self,
        wallet: &str,
        mode: FeeMode,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> LedgerResult<Vec<TransactionFeeEntry>> {
        let wallet = wallet.trim();
        if wallet.is_empty() {
            return Err(CoreError::invalid("wallet", "wallet is required").into());
        }
        let limit = limit.unwrap_or(DEFAULT_FEE_LIST_LIMIT);
        if limit == 0 || limit > MAX_FEE_LIST_LIMIT {
            return Err(CoreError::invalid("limit", "limit must be between 1 and 1000").into());
        }
        let offset = offset.unwrap_or(0);

        let rows = self
            .ledger
            .call_read_action(
                "list_transaction_fees",
                vec![
                    ActionArg::text(wallet.to_ascii_lowercase()),
                    ActionArg::text(mode.as_str()),
                    ActionArg::Int(i64::from(limit)),
                    ActionArg::Int(i64::from(offset)),
                ],
            )
            .await?;

        debug!(wallet, %mode, limit, offset, rows = rows.len(), "Listed transaction fees");
        rows.iter().map(TransactionFeeEntry::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLedger;
    use serde_json::Value;
    use std::sync::Arc;

    const TX: &str = "ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12ab12";

    fn event_row(recipient: Option<&str>, amount: Option<&str>) -> Row {
        Row::new()
            .with("tx_id", TX)
            .with("block_height", 77)
            .with("method", "insert_records")
            .with("caller", "0x1111111111111111111111111111111111111111")
            .with("fee_amount", "2000000000000000000")
            .with("fee_recipient", Value::Null)
            .with("metadata", Value::Null)
            .with(
                "distribution_recipient",
                recipient.map_or(Value::Null, Value::from),
            )
            .with(
                "distribution_amount",
                amount.map_or(Value::Null, Value::from),
            )
    }

    fn setup() -> (Arc<MockLedger>, TransactionLedger) {
        let mock = Arc::new(MockLedger::default());
        let ledger = TransactionLedger::new(mock.clone());
        (mock, ledger)
    }

    #[tokio::test]
    async fn test_event_with_and_without_prefix() {
        let (mock, ledger) = setup();
        mock.set_read_rows(
            "get_transaction_event",
            vec![
                event_row(Some("0xaaaa"), Some("1500000000000000000")),
                event_row(Some("0xbbbb"), Some("500000000000000000")),
            ],
        );

        let plain = ledger.get_transaction_event(TX).await.unwrap();
        let prefixed = ledger
            .get_transaction_event(&format!("0x{}", TX.to_uppercase()))
            .await
            .unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain.block_height, 77);
        assert_eq!(plain.fee_distributions.len(), 2);
        assert_eq!(plain.fee_distributions[1].recipient, "0xbbbb");

        let reads = mock.reads();
        assert_eq!(reads[0].args, reads[1].args);
    }

    #[tokio::test]
    async fn test_event_without_distributions() {
        let (mock, ledger) = setup();
        mock.set_read_rows("get_transaction_event", vec![event_row(None, None)]);
        let event = ledger.get_transaction_event(TX).await.unwrap();
        assert!(event.fee_distributions.is_empty());
        assert_eq!(event.fee_recipient, None);
    }

    #[tokio::test]
    async fn test_event_validation_and_not_found() {
        let (_mock, ledger) = setup();
        let err = ledger.get_transaction_event("").await.unwrap_err();
        assert_eq!(err.to_string(), "tx_id is required");
        let err = ledger.get_transaction_event("0x").await.unwrap_err();
        assert_eq!(err.to_string(), "tx_id is required");

        let err = ledger.get_transaction_event(TX).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fee_list_validation() {
        let (mock, ledger) = setup();
        let wallet = "0x1111111111111111111111111111111111111111";

        let err = ledger
            .list_transaction_fees("", FeeMode::Paid, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "wallet is required");

        for bad in [0, 1001] {
            let err = ledger
                .list_transaction_fees(wallet, FeeMode::Both, Some(bad), None)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "limit must be between 1 and 1000");
        }
        assert!(mock.reads().is_empty());

        ledger
            .list_transaction_fees(wallet, FeeMode::Received, Some(1000), Some(5))
            .await
            .unwrap();
        let call = &mock.reads()[0];
        assert_eq!(call.action, "list_transaction_fees");
        assert_eq!(call.args[1], ActionArg::text("received"));
        assert_eq!(call.args[2], ActionArg::Int(1000));
        assert_eq!(call.args[3], ActionArg::Int(5));
    }

    #[tokio::test]
    async fn test_fee_entries_decoded() {
        let (mock, ledger) = setup();
        mock.set_read_rows(
            "list_transaction_fees",
            vec![Row::new()
                .with("tx_id", TX)
                .with("block_height", "12")
                .with("method", "deploy_stream")
                .with("caller", "0x1111111111111111111111111111111111111111")
                .with("total_fee", "100")
                .with(
                    "fee_recipient",
                    "0x2222222222222222222222222222222222222222",
                )
                .with("metadata", Value::Null)
                .with("distribution_sequence", 1)
                .with(
                    "distribution_recipient",
                    "0x3333333333333333333333333333333333333333",
                )
                .with("distribution_amount", "100")],
        );
        let entries = ledger
            .list_transaction_fees(
                "0x1111111111111111111111111111111111111111",
                FeeMode::Paid,
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].block_height, 12);
        assert_eq!(entries[0].distribution_sequence, 1);
        assert_eq!(entries[0].metadata, None);
    }
}
