//! Typed read models decoded from order-book rows.
//!
//! Each projection is decoded once at the ledger boundary. Token and
//! collateral amounts stay as the node's decimal strings; counts, prices and
//! timestamps are integers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use truf_codec::{decode_market_data, MarketData};
use truf_core::{MarketState, OrderKind};
use truf_ledger::{LedgerError, LedgerResult, Row};

use crate::error::MarketResult;

fn get_price(row: &Row, column: &str) -> LedgerResult<i32> {
    let value = row.get_i64(column)?;
    i32::try_from(value)
        .map_err(|_| LedgerError::decode(format!("column {column}: price {value} out of range")))
}

fn get_opt_price(row: &Row, column: &str) -> LedgerResult<Option<i32>> {
    match row.get(column) {
        Some(v) if !v.is_null() => get_price(row, column).map(Some),
        _ => Ok(None),
    }
}

/// Full market record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketInfo {
    pub query_id: i64,
    /// `0x`-prefixed hex of the 32-byte query hash.
    pub query_hash: String,
    #[serde(skip)]
    pub query_components: Vec<u8>,
    pub bridge: String,
    pub settle_time: i64,
    pub settled: bool,
    pub winning_outcome: Option<bool>,
    pub settled_at: Option<i64>,
    pub max_spread: i32,
    pub min_order_size: i64,
    pub created_at: i64,
    pub creator: String,
}

impl MarketInfo {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            query_id: row.get_i64("id")?,
            query_hash: row.get_hex("hash")?,
            query_components: row.get_bytes("query_components")?,
            bridge: row.get_string("bridge")?,
            settle_time: row.get_i64("settle_time")?,
            settled: row.get_bool("settled")?,
            winning_outcome: row.get_opt_bool("winning_outcome")?,
            settled_at: row.get_opt_i64("settled_at")?,
            max_spread: get_price(row, "max_spread")?,
            min_order_size: row.get_i64("min_order_size")?,
            created_at: row.get_i64("created_at")?,
            creator: row.get_hex("creator")?,
        })
    }

    pub fn state(&self, now: DateTime<Utc>) -> MarketState {
        MarketState::derive(self.settled, self.settle_time, now)
    }

    /// Decode what this market settles on.
    pub fn market_data(&self) -> MarketResult<MarketData> {
        Ok(decode_market_data(&self.query_components)?)
    }
}

/// List projection of a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSummary {
    pub query_id: i64,
    pub query_hash: String,
    pub settle_time: i64,
    pub settled: bool,
    pub winning_outcome: Option<bool>,
    pub max_spread: i32,
    pub min_order_size: i64,
    pub created_at: i64,
}

impl MarketSummary {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            query_id: row.get_i64("id")?,
            query_hash: row.get_hex("hash")?,
            settle_time: row.get_i64("settle_time")?,
            settled: row.get_bool("settled")?,
            winning_outcome: row.get_opt_bool("winning_outcome")?,
            max_spread: get_price(row, "max_spread")?,
            min_order_size: row.get_i64("min_order_size")?,
            created_at: row.get_i64("created_at")?,
        })
    }

    pub fn state(&self, now: DateTime<Utc>) -> MarketState {
        MarketState::derive(self.settled, self.settle_time, now)
    }
}

/// One resting order or holding in a market outcome's book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBookEntry {
    pub participant_id: i64,
    pub wallet_address: String,
    /// Signed price in cents.
    pub price: i32,
    pub amount: i64,
    pub last_updated: i64,
    pub kind: OrderKind,
}

impl OrderBookEntry {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        let price = get_price(row, "price")?;
        Ok(Self {
            participant_id: row.get_i64("participant_id")?,
            wallet_address: row.get_hex("wallet_address")?,
            price,
            amount: row.get_i64("amount")?,
            last_updated: row.get_i64("last_updated")?,
            kind: OrderKind::from_price(price),
        })
    }
}

/// The caller's position in one market outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPosition {
    pub query_id: i64,
    pub outcome: bool,
    pub price: i32,
    pub amount: i64,
    pub kind: OrderKind,
}

impl UserPosition {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        let price = get_price(row, "price")?;
        Ok(Self {
            query_id: row.get_i64("query_id")?,
            outcome: row.get_bool("outcome")?,
            price,
            amount: row.get_i64("amount")?,
            kind: OrderKind::from_price(price),
        })
    }
}

/// Aggregated volume at one price level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    pub price: i32,
    pub buy_volume: i64,
    pub sell_volume: i64,
}

impl DepthLevel {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            price: get_price(row, "price")?,
            buy_volume: row.get_opt_i64("buy_volume")?.unwrap_or(0),
            sell_volume: row.get_opt_i64("sell_volume")?.unwrap_or(0),
        })
    }
}

/// Top of book. Empty sides are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BestPrices {
    pub best_bid: Option<i32>,
    pub best_ask: Option<i32>,
    pub spread: Option<i32>,
}

impl BestPrices {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            best_bid: get_opt_price(row, "best_bid")?,
            best_ask: get_opt_price(row, "best_ask")?,
            spread: get_opt_price(row, "spread")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCollateral {
    pub total_locked: String,
    pub buy_orders_locked: String,
    pub shares_value: String,
}

impl UserCollateral {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            total_locked: row.get_string("total_locked")?,
            buy_orders_locked: row.get_string("buy_orders_locked")?,
            shares_value: row.get_string("shares_value")?,
        })
    }
}

/// Token parity and vault balance check for one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketValidation {
    pub valid_token_binaries: bool,
    pub valid_collateral: bool,
    pub total_true: i64,
    pub total_false: i64,
    pub vault_balance: String,
    pub expected_collateral: String,
    pub open_buys_value: i64,
}

impl MarketValidation {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            valid_token_binaries: row.get_bool("valid_token_binaries")?,
            valid_collateral: row.get_bool("valid_collateral")?,
            total_true: row.get_i64("total_true")?,
            total_false: row.get_i64("total_false")?,
            vault_balance: row.get_string("vault_balance")?,
            expected_collateral: row.get_string("expected_collateral")?,
            open_buys_value: row.get_i64("open_buys_value")?,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.valid_token_binaries && self.valid_collateral
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionSummary {
    pub distribution_id: i64,
    pub total_fees_distributed: String,
    pub total_lp_count: i64,
    pub block_count: i64,
    pub distributed_at: i64,
}

impl DistributionSummary {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            distribution_id: row.get_i64("distribution_id")?,
            total_fees_distributed: row.get_string("total_fees_distributed")?,
            total_lp_count: row.get_i64("total_lp_count")?,
            block_count: row.get_i64("block_count")?,
            distributed_at: row.get_i64("distributed_at")?,
        })
    }
}

/// One liquidity provider's share of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LpRewardDetail {
    pub wallet_address: String,
    pub reward_amount: String,
    pub total_reward_percent: String,
}

impl LpRewardDetail {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            wallet_address: row.get_hex("wallet_address")?,
            reward_amount: row.get_string("reward_amount")?,
            total_reward_percent: row.get_string("total_reward_percent")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardHistory {
    pub distribution_id: i64,
    pub query_id: i64,
    pub reward_amount: String,
    pub total_reward_percent: String,
    pub distributed_at: i64,
}

impl RewardHistory {
    pub fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            distribution_id: row.get_i64("distribution_id")?,
            query_id: row.get_i64("query_id")?,
            reward_amount: row.get_string("reward_amount")?,
            total_reward_percent: row.get_string("total_reward_percent")?,
            distributed_at: row.get_i64("distributed_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn market_row(settled: bool) -> Row {
        Row::new()
            .with("id", 7)
            .with("hash", format!("0x{}", "aa".repeat(32)))
            .with("query_components", format!("0x{}", "00".repeat(128)))
            .with("bridge", "hoodi_tt2")
            .with("settle_time", 1_800_000_000i64)
            .with("settled", settled)
            .with("winning_outcome", settled.then_some(true))
            .with("max_spread", 5)
            .with("min_order_size", "100")
            .with("created_at", 1200)
            .with("creator", format!("0x{}", "11".repeat(20)))
    }

    #[test]
    fn test_market_info_decoding() {
        let info = MarketInfo::from_row(&market_row(false)).unwrap();
        assert_eq!(info.query_id, 7);
        assert_eq!(info.query_hash.len(), 66);
        assert_eq!(info.query_components.len(), 128);
        assert_eq!(info.winning_outcome, None);
        assert_eq!(info.settled_at, None);
        assert_eq!(info.min_order_size, 100);

        let before = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let after = Utc.timestamp_opt(1_800_000_000, 0).unwrap();
        assert_eq!(info.state(before), MarketState::Open);
        assert_eq!(info.state(after), MarketState::Settling);

        let settled = MarketInfo::from_row(&market_row(true)).unwrap();
        assert_eq!(settled.winning_outcome, Some(true));
        assert_eq!(settled.state(before), MarketState::Settled);
    }

    #[test]
    fn test_missing_column_names_field() {
        let row = Row::new().with("id", 1);
        let err = MarketSummary::from_row(&row).unwrap_err();
        assert!(err.to_string().contains("hash"), "{err}");
    }

    #[test]
    fn test_order_kind_from_price_sign() {
        let entry = |price: i32| {
            OrderBookEntry::from_row(
                &Row::new()
                    .with("participant_id", 1)
                    .with("wallet_address", format!("0x{}", "22".repeat(20)))
                    .with("price", price)
                    .with("amount", 10)
                    .with("last_updated", 5),
            )
            .unwrap()
        };
        assert_eq!(entry(0).kind, OrderKind::Holding);
        assert_eq!(entry(-45).kind, OrderKind::Buy);
        assert_eq!(entry(55).kind, OrderKind::Sell);
    }

    #[test]
    fn test_best_prices_nullable() {
        let prices = BestPrices::from_row(
            &Row::new()
                .with("best_bid", -45)
                .with("best_ask", Value::Null)
                .with("spread", Value::Null),
        )
        .unwrap();
        assert_eq!(prices.best_bid, Some(-45));
        assert_eq!(prices.best_ask, None);
    }

    #[test]
    fn test_price_out_of_range_is_decode_error() {
        let row = Row::new().with("price", i64::MAX).with("buy_volume", 1);
        assert!(matches!(DepthLevel::from_row(&row), Err(LedgerError::Decode(_))));
    }
}
