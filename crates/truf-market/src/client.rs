//! Order-book client.
//!
//! Write operations validate locally and only then submit; a rejected call
//! never reaches the ledger. Reads decode rows into typed projections.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use truf_codec::ActionArg;
use truf_core::{CoreError, Outcome};
use truf_ledger::{DynLedgerClient, LedgerError, Row, TxHash, TxOutcome};
use truf_telemetry::Metrics;

use crate::error::{MarketError, MarketResult};
use crate::models::{
    BestPrices, DepthLevel, DistributionSummary, LpRewardDetail, MarketInfo, MarketSummary,
    MarketValidation, OrderBookEntry, RewardHistory, UserCollateral, UserPosition,
};
use crate::query::{BinaryCondition, BinaryMarketQuery};
use crate::validation;

/// Market parameters shared by `create_market` and the binary constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Collateral bridge, e.g. `"hoodi_tt2"`.
    pub bridge: String,
    /// Unix timestamp after which the market can settle.
    pub settle_time: i64,
    /// Widest spread in cents that still earns LP rewards (1-50).
    pub max_spread: i32,
    /// Smallest order that earns LP rewards.
    pub min_order_size: i64,
}

/// Record a rejection and pass the result through.
fn gate<T>(operation: &'static str, result: Result<T, CoreError>) -> MarketResult<T> {
    result.map_err(|err| {
        Metrics::validation_rejected(operation, err.field().unwrap_or("unknown"));
        debug!(operation, error = %err, "Rejected before submission");
        MarketError::Validation(err)
    })
}

fn first_row(rows: Vec<Row>, what: impl FnOnce() -> String) -> MarketResult<Row> {
    rows.into_iter()
        .next()
        .ok_or_else(|| MarketError::Ledger(LedgerError::NotFound(what())))
}

fn decode_all<T>(
    rows: &[Row],
    decode: impl Fn(&Row) -> Result<T, LedgerError>,
) -> MarketResult<Vec<T>> {
    Ok(rows.iter().map(decode).collect::<Result<Vec<_>, _>>()?)
}

/// Prediction-market order book client.
pub struct MarketClient {
    ledger: DynLedgerClient,
}

impl MarketClient {
    pub fn new(ledger: DynLedgerClient) -> Self {
        Self { ledger }
    }

    async fn submit(&self, action: &'static str, args: Vec<ActionArg>) -> MarketResult<TxHash> {
        let tx_hash = self.ledger.submit(action, args).await?;
        info!(action, tx_hash = %tx_hash, "Order book transaction submitted");
        Ok(tx_hash)
    }

    async fn read(&self, action: &'static str, args: Vec<ActionArg>) -> MarketResult<Vec<Row>> {
        let rows = self.ledger.call_read_action(action, args).await?;
        debug!(action, rows = rows.len(), "Order book read");
        Ok(rows)
    }

    /// Wait for a submitted transaction; a failed execution is an error.
    pub async fn wait_for_tx(&self, tx_hash: TxHash) -> MarketResult<TxOutcome> {
        Ok(self.ledger.wait_for_tx(tx_hash).await?)
    }

    /// Create a market for `query_components`. Returns the transaction hash.
    ///
    /// Duplicate markets (same query hash) are rejected by the node.
    pub async fn create_market(
        &self,
        query_components: &[u8],
        params: &MarketParams,
    ) -> MarketResult<TxHash> {
        let bridge = gate(
            "create_market",
            validation::validate_create_market(
                &params.bridge,
                query_components,
                params.max_spread,
                params.min_order_size,
            ),
        )?;

        self.submit(
            "create_market",
            vec![
                ActionArg::text(bridge.as_str()),
                ActionArg::Bytes(query_components.to_vec()),
                ActionArg::Int(params.settle_time),
                ActionArg::Int(i64::from(params.max_spread)),
                ActionArg::Int(params.min_order_size),
            ],
        )
        .await
    }

    /// Build the query components for `query` and create the market.
    pub async fn create_binary_market(
        &self,
        query: &BinaryMarketQuery,
        params: &MarketParams,
    ) -> MarketResult<TxHash> {
        let query_components = match query.to_query_components() {
            Ok(qc) => qc,
            Err(MarketError::Validation(err)) => return gate("create_market", Err(err)),
            Err(err) => return Err(err),
        };
        info!(
            action = query.condition.action().name(),
            stream_id = %query.stream_id,
            "Creating binary market"
        );
        self.create_market(&query_components, params).await
    }

    /// TRUE if the stream value exceeds `threshold` at `timestamp`.
    pub async fn create_price_above_threshold_market(
        &self,
        data_provider: &str,
        stream_id: &str,
        timestamp: i64,
        threshold: &str,
        frozen_at: Option<i64>,
        params: &MarketParams,
    ) -> MarketResult<TxHash> {
        let condition = BinaryCondition::PriceAbove {
            threshold: threshold.to_string(),
        };
        self.create_binary_market(
            &binary_query(data_provider, stream_id, timestamp, condition, frozen_at),
            params,
        )
        .await
    }

    /// TRUE if the stream value is below `threshold` at `timestamp`.
    pub async fn create_price_below_threshold_market(
        &self,
        data_provider: &str,
        stream_id: &str,
        timestamp: i64,
        threshold: &str,
        frozen_at: Option<i64>,
        params: &MarketParams,
    ) -> MarketResult<TxHash> {
        let condition = BinaryCondition::PriceBelow {
            threshold: threshold.to_string(),
        };
        self.create_binary_market(
            &binary_query(data_provider, stream_id, timestamp, condition, frozen_at),
            params,
        )
        .await
    }

    /// TRUE if `min_value <= value <= max_value` at `timestamp`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_value_in_range_market(
        &self,
        data_provider: &str,
        stream_id: &str,
        timestamp: i64,
        min_value: &str,
        max_value: &str,
        frozen_at: Option<i64>,
        params: &MarketParams,
    ) -> MarketResult<TxHash> {
        let condition = BinaryCondition::ValueInRange {
            min: min_value.to_string(),
            max: max_value.to_string(),
        };
        self.create_binary_market(
            &binary_query(data_provider, stream_id, timestamp, condition, frozen_at),
            params,
        )
        .await
    }

    /// TRUE if the value is within `tolerance` of `target_value` at `timestamp`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_value_equals_market(
        &self,
        data_provider: &str,
        stream_id: &str,
        timestamp: i64,
        target_value: &str,
        tolerance: &str,
        frozen_at: Option<i64>,
        params: &MarketParams,
    ) -> MarketResult<TxHash> {
        let condition = BinaryCondition::ValueEquals {
            target: target_value.to_string(),
            tolerance: tolerance.to_string(),
        };
        self.create_binary_market(
            &binary_query(data_provider, stream_id, timestamp, condition, frozen_at),
            params,
        )
        .await
    }

    /// Bid for `amount` shares of `outcome` at `price` cents.
    pub async fn place_buy_order(
        &self,
        query_id: i64,
        outcome: Outcome,
        price: i32,
        amount: i64,
    ) -> MarketResult<TxHash> {
        gate("place_buy_order", validation::validate_order(price, amount))?;
        self.submit(
            "place_buy_order",
            order_args(query_id, outcome, price, amount),
        )
        .await
    }

    /// Offer `amount` held shares of `outcome` at `price` cents.
    pub async fn place_sell_order(
        &self,
        query_id: i64,
        outcome: Outcome,
        price: i32,
        amount: i64,
    ) -> MarketResult<TxHash> {
        gate(
            "place_sell_order",
            validation::validate_order(price, amount),
        )?;
        self.submit(
            "place_sell_order",
            order_args(query_id, outcome, price, amount),
        )
        .await
    }

    /// Mint `amount` YES/NO pairs, keep YES and offer NO at `100 - true_price`.
    pub async fn place_split_limit_order(
        &self,
        query_id: i64,
        true_price: i32,
        amount: i64,
    ) -> MarketResult<TxHash> {
        gate(
            "place_split_limit_order",
            validation::validate_split_limit_order(true_price, amount),
        )?;
        self.submit(
            "place_split_limit_order",
            vec![
                ActionArg::Int(query_id),
                ActionArg::Int(i64::from(true_price)),
                ActionArg::Int(amount),
            ],
        )
        .await
    }

    /// Cancel the resting order at signed `price`.
    pub async fn cancel_order(
        &self,
        query_id: i64,
        outcome: Outcome,
        price: i32,
    ) -> MarketResult<TxHash> {
        gate("cancel_order", validation::validate_cancel(price))?;
        self.submit(
            "cancel_order",
            vec![
                ActionArg::Int(query_id),
                ActionArg::Bool(outcome.as_bool()),
                ActionArg::Int(i64::from(price)),
            ],
        )
        .await
    }

    /// Atomically move a bid. Prices use the signed (negative) convention.
    pub async fn change_bid(
        &self,
        query_id: i64,
        outcome: Outcome,
        old_price: i32,
        new_price: i32,
        new_amount: i64,
    ) -> MarketResult<TxHash> {
        gate(
            "change_bid",
            validation::validate_change_bid(old_price, new_price, new_amount),
        )?;
        self.submit(
            "change_bid",
            change_args(query_id, outcome, old_price, new_price, new_amount),
        )
        .await
    }

    /// Atomically move an ask.
    pub async fn change_ask(
        &self,
        query_id: i64,
        outcome: Outcome,
        old_price: i32,
        new_price: i32,
        new_amount: i64,
    ) -> MarketResult<TxHash> {
        gate(
            "change_ask",
            validation::validate_change_ask(old_price, new_price, new_amount),
        )?;
        self.submit(
            "change_ask",
            change_args(query_id, outcome, old_price, new_price, new_amount),
        )
        .await
    }

    /// Settle using the market's attestation. The node checks eligibility.
    pub async fn settle_market(&self, query_id: i64) -> MarketResult<TxHash> {
        self.submit("settle_market", vec![ActionArg::Int(query_id)])
            .await
    }

    /// Record an LP reward sample for `block`.
    pub async fn sample_lp_rewards(&self, query_id: i64, block: i64) -> MarketResult<TxHash> {
        self.submit(
            "sample_lp_rewards",
            vec![ActionArg::Int(query_id), ActionArg::Int(block)],
        )
        .await
    }

    pub async fn get_market_info(&self, query_id: i64) -> MarketResult<MarketInfo> {
        let rows = self
            .read("get_market_info", vec![ActionArg::Int(query_id)])
            .await?;
        let row = first_row(rows, || format!("market {query_id} not found"))?;
        Ok(MarketInfo::from_row(&row)?)
    }

    pub async fn get_market_by_hash(&self, query_hash: &[u8]) -> MarketResult<MarketInfo> {
        gate(
            "get_market_by_hash",
            validation::validate_query_hash(query_hash),
        )?;
        let rows = self
            .read(
                "get_market_by_hash",
                vec![ActionArg::Bytes(query_hash.to_vec())],
            )
            .await?;
        let row = first_row(rows, || {
            format!("market with hash 0x{} not found", hex::encode(query_hash))
        })?;
        Ok(MarketInfo::from_row(&row)?)
    }

    pub async fn market_exists(&self, query_hash: &[u8]) -> MarketResult<bool> {
        gate("market_exists", validation::validate_query_hash(query_hash))?;
        match self.get_market_by_hash(query_hash).await {
            Ok(_) => Ok(true),
            Err(MarketError::Ledger(err)) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Page through markets. `None` leaves the filter or paging to the node.
    pub async fn list_markets(
        &self,
        settled_filter: Option<bool>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> MarketResult<Vec<MarketSummary>> {
        let rows = self
            .read(
                "list_markets",
                vec![
                    settled_filter.map_or(ActionArg::Null, ActionArg::Bool),
                    ActionArg::opt_int(limit),
                    ActionArg::opt_int(offset),
                ],
            )
            .await?;
        decode_all(&rows, MarketSummary::from_row)
    }

    pub async fn get_order_book(
        &self,
        query_id: i64,
        outcome: Outcome,
    ) -> MarketResult<Vec<OrderBookEntry>> {
        let rows = self
            .read("get_order_book", outcome_args(query_id, outcome))
            .await?;
        decode_all(&rows, OrderBookEntry::from_row)
    }

    /// Positions of the signing account across all markets.
    pub async fn get_user_positions(&self) -> MarketResult<Vec<UserPosition>> {
        let rows = self.read("get_user_positions", Vec::new()).await?;
        decode_all(&rows, UserPosition::from_row)
    }

    pub async fn get_market_depth(
        &self,
        query_id: i64,
        outcome: Outcome,
    ) -> MarketResult<Vec<DepthLevel>> {
        let rows = self
            .read("get_market_depth", outcome_args(query_id, outcome))
            .await?;
        decode_all(&rows, DepthLevel::from_row)
    }

    /// Best bid and ask. An empty book yields all `None`.
    pub async fn get_best_prices(
        &self,
        query_id: i64,
        outcome: Outcome,
    ) -> MarketResult<BestPrices> {
        let rows = self
            .read("get_best_prices", outcome_args(query_id, outcome))
            .await?;
        match rows.first() {
            Some(row) => Ok(BestPrices::from_row(row)?),
            None => Ok(BestPrices::default()),
        }
    }

    pub async fn get_user_collateral(&self) -> MarketResult<UserCollateral> {
        let rows = self.read("get_user_collateral", Vec::new()).await?;
        let account = self.ledger.current_account();
        let row = first_row(rows, || format!("collateral for {account:#x} not found"))?;
        Ok(UserCollateral::from_row(&row)?)
    }

    pub async fn validate_market_collateral(
        &self,
        query_id: i64,
    ) -> MarketResult<MarketValidation> {
        let rows = self
            .read("validate_market_collateral", vec![ActionArg::Int(query_id)])
            .await?;
        let row = first_row(rows, || format!("market {query_id} not found"))?;
        let validation = MarketValidation::from_row(&row)?;
        if !validation.is_valid() {
            warn!(
                query_id,
                valid_token_binaries = validation.valid_token_binaries,
                valid_collateral = validation.valid_collateral,
                "Market collateral check failed"
            );
        }
        Ok(validation)
    }

    /// Latest fee distribution, or `None` before the first one.
    pub async fn get_distribution_summary(
        &self,
        query_id: i64,
    ) -> MarketResult<Option<DistributionSummary>> {
        let rows = self
            .read("get_distribution_summary", vec![ActionArg::Int(query_id)])
            .await?;
        rows.first()
            .map(DistributionSummary::from_row)
            .transpose()
            .map_err(MarketError::from)
    }

    pub async fn get_distribution_details(
        &self,
        distribution_id: i64,
    ) -> MarketResult<Vec<LpRewardDetail>> {
        let rows = self
            .read(
                "get_distribution_details",
                vec![ActionArg::Int(distribution_id)],
            )
            .await?;
        decode_all(&rows, LpRewardDetail::from_row)
    }

    pub async fn get_participant_reward_history(
        &self,
        wallet: &str,
    ) -> MarketResult<Vec<RewardHistory>> {
        let rows = self
            .read(
                "get_participant_reward_history",
                vec![ActionArg::text(wallet.trim().to_ascii_lowercase())],
            )
            .await?;
        decode_all(&rows, RewardHistory::from_row)
    }
}

fn binary_query(
    data_provider: &str,
    stream_id: &str,
    timestamp: i64,
    condition: BinaryCondition,
    frozen_at: Option<i64>,
) -> BinaryMarketQuery {
    BinaryMarketQuery {
        data_provider: data_provider.to_string(),
        stream_id: stream_id.to_string(),
        timestamp,
        condition,
        frozen_at,
    }
}

fn outcome_args(query_id: i64, outcome: Outcome) -> Vec<ActionArg> {
    vec![ActionArg::Int(query_id), ActionArg::Bool(outcome.as_bool())]
}

fn order_args(query_id: i64, outcome: Outcome, price: i32, amount: i64) -> Vec<ActionArg> {
    vec![
        ActionArg::Int(query_id),
        ActionArg::Bool(outcome.as_bool()),
        ActionArg::Int(i64::from(price)),
        ActionArg::Int(amount),
    ]
}

fn change_args(
    query_id: i64,
    outcome: Outcome,
    old_price: i32,
    new_price: i32,
    new_amount: i64,
) -> Vec<ActionArg> {
    vec![
        ActionArg::Int(query_id),
        ActionArg::Bool(outcome.as_bool()),
        ActionArg::Int(i64::from(old_price)),
        ActionArg::Int(i64::from(new_price)),
        ActionArg::Int(new_amount),
    ]
}
