//! Command execution.
//!
//! Offline commands (action registry, payload verification and decoding,
//! query-component encoding) run without a key or network. Everything else
//! goes through one [`DynLedgerClient`] shared by the attestation, market and
//! transaction clients. Results are returned as JSON for printing.

use crate::cli::{
    AttestationCommand, BinaryMarketArgs, BookArgs, ChangeArgs, Command, ConditionKind,
    MarketCommand, MarketParamsArgs, RewardsCommand, TxCommand,
};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use truf_attestation::{
    parse_attestation_payload, parse_boolean_result, verify_attestation_signature,
    AttestationClient, AttestationRequest, ListAttestationsQuery,
};
use truf_codec::{decode_market_data, ActionArg};
use truf_core::{action_registry, Outcome};
use truf_ledger::{DynLedgerClient, HttpLedger, KeyManager, TransactionLedger, TxHash};
use truf_market::{find_lp_pairs, BinaryCondition, BinaryMarketQuery, MarketClient, MarketParams};

fn to_json<T: Serialize>(value: &T) -> AppResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn binary_query(args: &BinaryMarketArgs) -> AppResult<BinaryMarketQuery> {
    let second = || {
        args.second_value.clone().ok_or_else(|| {
            AppError::InvalidArgument("--second-value is required for this condition".to_string())
        })
    };
    let condition = match args.condition {
        ConditionKind::Above => BinaryCondition::PriceAbove {
            threshold: args.value.clone(),
        },
        ConditionKind::Below => BinaryCondition::PriceBelow {
            threshold: args.value.clone(),
        },
        ConditionKind::Range => BinaryCondition::ValueInRange {
            min: args.value.clone(),
            max: second()?,
        },
        ConditionKind::Equals => BinaryCondition::ValueEquals {
            target: args.value.clone(),
            tolerance: second()?,
        },
    };
    Ok(BinaryMarketQuery {
        data_provider: args.data_provider.clone(),
        stream_id: args.stream_id.clone(),
        timestamp: args.timestamp,
        condition,
        frozen_at: args.frozen_at,
    })
}

fn market_params(args: &MarketParamsArgs) -> MarketParams {
    MarketParams {
        bridge: args.bridge.clone(),
        settle_time: args.settle_time,
        max_spread: args.max_spread,
        min_order_size: args.min_order_size,
    }
}

/// Run a command that needs no ledger.
pub fn run_offline(command: &Command) -> AppResult<Value> {
    match command {
        Command::Actions => to_json(&action_registry()),
        Command::Attestation(AttestationCommand::Verify { payload }) => {
            let verified = verify_attestation_signature(&payload.0)?;
            Ok(json!({
                "validator_address": verified.validator_address,
                "canonical_payload": format!("0x{}", hex::encode(&verified.canonical_payload)),
            }))
        }
        Command::Attestation(AttestationCommand::Parse { payload, boolean }) => {
            if *boolean {
                to_json(&parse_boolean_result(&payload.0)?)
            } else {
                to_json(&parse_attestation_payload(&payload.0)?)
            }
        }
        Command::Market(MarketCommand::Encode(args)) => {
            let query_components = binary_query(args)?.to_query_components()?;
            Ok(json!({
                "query_components": format!("0x{}", hex::encode(query_components)),
            }))
        }
        Command::Market(MarketCommand::Decode { query_components }) => {
            to_json(&decode_market_data(&query_components.0)?)
        }
        other => Err(AppError::InvalidArgument(format!(
            "command needs a ledger connection: {other:?}"
        ))),
    }
}

/// Ledger-backed clients.
pub struct Application {
    config: AppConfig,
    ledger: DynLedgerClient,
    attestations: AttestationClient,
    markets: MarketClient,
    transactions: TransactionLedger,
}

impl Application {
    /// Load the key and connect to the configured gateway.
    pub fn connect(config: AppConfig) -> AppResult<Self> {
        let keys = KeyManager::load(config.key.key_source(), config.key.expected_address()?)?;
        info!(account = %keys.address(), endpoint = %config.ledger.endpoint, "Signing key loaded");
        let ledger = HttpLedger::new(config.ledger.to_http_config(), keys)?;
        Ok(Self::with_ledger(config, Arc::new(ledger)))
    }

    /// Use an existing ledger (tests, embedding).
    pub fn with_ledger(config: AppConfig, ledger: DynLedgerClient) -> Self {
        let poll = config.attestation.poll_config();
        Self {
            attestations: AttestationClient::with_poll_config(ledger.clone(), poll),
            markets: MarketClient::new(ledger.clone()),
            transactions: TransactionLedger::new(ledger.clone()),
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn execute(&self, command: Command) -> AppResult<Value> {
        if command.is_offline() {
            return run_offline(&command);
        }
        debug!(account = %format!("{:#x}", self.ledger.current_account()), "Executing command");
        match command {
            Command::Attestation(cmd) => self.attestation(cmd).await,
            Command::Market(cmd) => self.market(cmd).await,
            Command::Tx(cmd) => self.tx(cmd).await,
            Command::Actions => to_json(&action_registry()),
        }
    }

    async fn submitted(&self, tx_hash: TxHash, wait: bool) -> AppResult<Value> {
        if !wait {
            return Ok(json!({ "tx_hash": tx_hash }));
        }
        let outcome = self.ledger.wait_for_tx(tx_hash).await?;
        to_json(&outcome)
    }

    async fn attestation(&self, cmd: AttestationCommand) -> AppResult<Value> {
        match cmd {
            AttestationCommand::Request {
                data_provider,
                stream_id,
                action,
                args,
                max_fee,
                wait,
                wait_signature,
            } => {
                let request = AttestationRequest::new(
                    data_provider,
                    stream_id,
                    action,
                    args.into_iter().map(|a| a.0).collect::<Vec<ActionArg>>(),
                    max_fee.unwrap_or_else(|| self.config.attestation.default_max_fee.clone()),
                );
                let tx_hash = self
                    .attestations
                    .request_attestation(&request, wait || wait_signature)
                    .await?;
                if !wait_signature {
                    return Ok(json!({ "request_tx_id": tx_hash }));
                }
                let payload = self
                    .attestations
                    .wait_for_signature(tx_hash.as_str())
                    .await?;
                Ok(json!({
                    "request_tx_id": tx_hash,
                    "payload": format!("0x{}", hex::encode(payload)),
                }))
            }
            AttestationCommand::Get { request_tx_id } => {
                let payload = self
                    .attestations
                    .get_signed_attestation(&request_tx_id)
                    .await?;
                Ok(json!({ "payload": format!("0x{}", hex::encode(payload)) }))
            }
            AttestationCommand::Status { request_tx_id } => {
                let status = self.attestations.attestation_status(&request_tx_id).await?;
                Ok(json!({ "request_tx_id": request_tx_id, "status": status }))
            }
            AttestationCommand::Wait { request_tx_id } => {
                let payload = self.attestations.wait_for_signature(&request_tx_id).await?;
                Ok(json!({ "payload": format!("0x{}", hex::encode(payload)) }))
            }
            AttestationCommand::List {
                requester,
                limit,
                offset,
                order_by,
            } => {
                let mut query = ListAttestationsQuery::new();
                if let Some(requester) = requester {
                    query = query.requester(requester.0);
                }
                if let Some(limit) = limit {
                    query = query.limit(limit);
                }
                if let Some(offset) = offset {
                    query = query.offset(offset);
                }
                if let Some(order_by) = order_by {
                    query = query.order_by(order_by);
                }
                to_json(&self.attestations.list_attestations(&query).await?)
            }
            cmd @ (AttestationCommand::Verify { .. } | AttestationCommand::Parse { .. }) => {
                run_offline(&Command::Attestation(cmd))
            }
        }
    }

    async fn market(&self, cmd: MarketCommand) -> AppResult<Value> {
        let m = &self.markets;
        match cmd {
            MarketCommand::Create {
                query_components,
                params,
                wait,
            } => {
                let tx = m
                    .create_market(&query_components.0, &market_params(&params))
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::CreateBinary {
                market,
                params,
                wait,
            } => {
                let tx = m
                    .create_binary_market(&binary_query(&market)?, &market_params(&params))
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::Buy {
                book,
                price,
                amount,
                wait,
            } => {
                let tx = m
                    .place_buy_order(book.query_id, book.outcome.into(), price, amount)
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::Sell {
                book,
                price,
                amount,
                wait,
            } => {
                let tx = m
                    .place_sell_order(book.query_id, book.outcome.into(), price, amount)
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::Split {
                query_id,
                true_price,
                amount,
                wait,
            } => {
                let tx = m
                    .place_split_limit_order(query_id, true_price, amount)
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::Cancel { book, price, wait } => {
                let tx = m
                    .cancel_order(book.query_id, book.outcome.into(), price)
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::ChangeBid { book, change } => {
                let ChangeArgs {
                    old_price,
                    new_price,
                    new_amount,
                    wait,
                } = change;
                let tx = m
                    .change_bid(
                        book.query_id,
                        book.outcome.into(),
                        old_price,
                        new_price,
                        new_amount,
                    )
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::ChangeAsk { book, change } => {
                let ChangeArgs {
                    old_price,
                    new_price,
                    new_amount,
                    wait,
                } = change;
                let tx = m
                    .change_ask(
                        book.query_id,
                        book.outcome.into(),
                        old_price,
                        new_price,
                        new_amount,
                    )
                    .await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::Settle { query_id, wait } => {
                let tx = m.settle_market(query_id).await?;
                self.submitted(tx, wait).await
            }
            MarketCommand::Info { query_id, hash } => match (query_id, hash) {
                (Some(id), None) => to_json(&m.get_market_info(id).await?),
                (None, Some(hash)) => to_json(&m.get_market_by_hash(&hash.0).await?),
                _ => Err(AppError::InvalidArgument(
                    "one of --query-id or --hash is required".to_string(),
                )),
            },
            MarketCommand::List {
                settled,
                limit,
                offset,
            } => to_json(&m.list_markets(settled, limit, offset).await?),
            MarketCommand::Book(BookArgs { query_id, outcome }) => {
                to_json(&m.get_order_book(query_id, outcome.into()).await?)
            }
            MarketCommand::Depth(BookArgs { query_id, outcome }) => {
                to_json(&m.get_market_depth(query_id, outcome.into()).await?)
            }
            MarketCommand::Best(BookArgs { query_id, outcome }) => {
                to_json(&m.get_best_prices(query_id, outcome.into()).await?)
            }
            MarketCommand::Positions => to_json(&m.get_user_positions().await?),
            MarketCommand::Collateral => to_json(&m.get_user_collateral().await?),
            MarketCommand::Validate { query_id } => {
                let validation = m.validate_market_collateral(query_id).await?;
                Ok(json!({ "valid": validation.is_valid(), "details": validation }))
            }
            MarketCommand::LpPairs { query_id } => {
                let yes = m.get_order_book(query_id, Outcome::Yes).await?;
                let no = m.get_order_book(query_id, Outcome::No).await?;
                to_json(&find_lp_pairs(&yes, &no))
            }
            MarketCommand::Rewards { command } => match command {
                RewardsCommand::Summary { query_id } => {
                    to_json(&m.get_distribution_summary(query_id).await?)
                }
                RewardsCommand::Details { distribution_id } => {
                    to_json(&m.get_distribution_details(distribution_id).await?)
                }
                RewardsCommand::History { wallet } => {
                    to_json(&m.get_participant_reward_history(&wallet).await?)
                }
                RewardsCommand::Sample { query_id, block } => {
                    let tx = m.sample_lp_rewards(query_id, block).await?;
                    self.submitted(tx, false).await
                }
            },
            cmd @ (MarketCommand::Encode(_) | MarketCommand::Decode { .. }) => {
                run_offline(&Command::Market(cmd))
            }
        }
    }

    async fn tx(&self, cmd: TxCommand) -> AppResult<Value> {
        match cmd {
            TxCommand::Event { tx_id } => {
                to_json(&self.transactions.get_transaction_event(&tx_id).await?)
            }
            TxCommand::Fees {
                wallet,
                mode,
                limit,
                offset,
            } => to_json(
                &self
                    .transactions
                    .list_transaction_fees(&wallet, mode, limit, offset)
                    .await?,
            ),
        }
    }
}
