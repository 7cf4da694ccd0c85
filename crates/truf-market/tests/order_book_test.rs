//! Order book client tests against the in-memory ledger.

use std::sync::Arc;

use serde_json::Value;
use truf_codec::{decode_market_data, ActionArg};
use truf_core::{MarketType, OrderKind, Outcome};
use truf_ledger::{LedgerError, MockLedger, Row, TxStatus};
use truf_market::{find_lp_pairs, MarketClient, MarketError, MarketParams};
use truf_telemetry::metrics::VALIDATION_REJECTED_TOTAL;

const PROVIDER: &str = "0x4710a8d8f0d845da110086812a32de6d90d7ff5c";
const STREAM: &str = "stbtcusd000000000000000000000000";

fn setup() -> (Arc<MockLedger>, MarketClient) {
    let mock = Arc::new(MockLedger::default());
    let client = MarketClient::new(mock.clone());
    (mock, client)
}

fn params() -> MarketParams {
    MarketParams {
        bridge: "hoodi_tt2".to_string(),
        settle_time: 1_767_225_600,
        max_spread: 5,
        min_order_size: 100,
    }
}

fn book_row(wallet: &str, price: i32, amount: i64) -> Row {
    Row::new()
        .with("participant_id", 1)
        .with("wallet_address", wallet)
        .with("price", price)
        .with("amount", amount)
        .with("last_updated", 10)
}

#[tokio::test]
async fn test_buy_order_boundaries() {
    let (mock, client) = setup();

    for bad in [0, 100] {
        let err = client
            .place_buy_order(1, Outcome::Yes, bad, 1)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "price must be between 1 and 99 cents");
        assert!(err.is_validation());
    }
    assert!(mock.submissions().is_empty());

    for good in [1, 99] {
        client
            .place_buy_order(1, Outcome::Yes, good, 1)
            .await
            .unwrap();
    }
    let subs = mock.submissions();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].action, "place_buy_order");
    assert_eq!(
        subs[1].args(),
        &[
            ActionArg::Int(1),
            ActionArg::Bool(true),
            ActionArg::Int(99),
            ActionArg::Int(1)
        ]
    );
}

#[tokio::test]
async fn test_cancel_holding_always_rejected() {
    let (mock, client) = setup();
    for (query_id, outcome) in [(1, Outcome::Yes), (2, Outcome::No), (999, Outcome::Yes)] {
        let err = client.cancel_order(query_id, outcome, 0).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot cancel holdings (price=0), use place_sell_order instead"
        );
    }
    assert!(mock.submissions().is_empty());

    client.cancel_order(1, Outcome::No, -45).await.unwrap();
    assert_eq!(mock.last_submission().unwrap().action, "cancel_order");
}

#[tokio::test]
async fn test_create_market_spread_boundaries() {
    let (mock, client) = setup();
    let qc = vec![0u8; 128];

    for bad in [0, 51] {
        let mut p = params();
        p.max_spread = bad;
        let err = client.create_market(&qc, &p).await.unwrap_err();
        assert_eq!(err.to_string(), "max_spread must be between 1 and 50");
    }
    for good in [1, 50] {
        let mut p = params();
        p.max_spread = good;
        client.create_market(&qc, &p).await.unwrap();
    }

    let sub = mock.last_submission().unwrap();
    assert_eq!(sub.action, "create_market");
    assert_eq!(sub.args()[0], ActionArg::text("hoodi_tt2"));
    assert_eq!(sub.args()[3], ActionArg::Int(50));
}

#[tokio::test]
async fn test_binary_constructor_submits_decodable_components() {
    let (mock, client) = setup();
    client
        .create_value_in_range_market(
            PROVIDER,
            STREAM,
            1_767_225_600,
            "90000",
            "110000",
            None,
            &params(),
        )
        .await
        .unwrap();

    let sub = mock.last_submission().unwrap();
    let qc = match &sub.args()[1] {
        ActionArg::Bytes(b) => b.clone(),
        other => panic!("expected bytes, got {other:?}"),
    };
    let data = decode_market_data(&qc).unwrap();
    assert_eq!(data.market_type, MarketType::Between);
    assert_eq!(data.thresholds, vec!["90000", "110000"]);
}

#[tokio::test]
async fn test_binary_constructor_validates_locator_first() {
    let (mock, client) = setup();
    let err = client
        .create_price_above_threshold_market("0xabc", STREAM, 0, "1", None, &params())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "data_provider must be 42 characters");

    let mut bad = params();
    bad.bridge = "polygon".to_string();
    let err = client
        .create_price_below_threshold_market(PROVIDER, STREAM, 0, "4", Some(10), &bad)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "bridge must be one of: hoodi_tt2, sepolia_bridge, ethereum_bridge"
    );
    assert!(mock.submissions().is_empty());
}

#[tokio::test]
async fn test_binary_constructor_rejects_non_hex_provider() {
    let (mock, client) = setup();
    let rejected = || {
        VALIDATION_REJECTED_TOTAL
            .with_label_values(&["create_market", "data_provider"])
            .get()
    };
    let before = rejected();

    let provider = format!("0x{}", "zz".repeat(20));
    let err = client
        .create_price_above_threshold_market(&provider, STREAM, 0, "1", None, &params())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Validation(_)));
    assert_eq!(err.to_string(), "data_provider must be a valid hex address");
    assert!(rejected() > before);
    assert!(mock.submissions().is_empty());
}

#[tokio::test]
async fn test_change_bid_and_ask() {
    let (mock, client) = setup();
    let err = client
        .change_bid(1, Outcome::Yes, 40, -45, 10)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "bid prices must be negative (buy orders)");
    let err = client
        .change_ask(1, Outcome::Yes, -40, 45, 10)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "ask prices must be positive (sell orders)");
    assert!(mock.submissions().is_empty());

    client
        .change_bid(1, Outcome::Yes, -40, -45, 10)
        .await
        .unwrap();
    client.change_ask(1, Outcome::No, 55, 60, 10).await.unwrap();
    let subs = mock.submissions();
    assert_eq!(subs[0].action, "change_bid");
    assert_eq!(subs[1].args()[3], ActionArg::Int(60));
}

#[tokio::test]
async fn test_failed_settlement_surfaces() {
    let (mock, client) = setup();
    let tx = client.settle_market(3).await.unwrap();
    mock.set_tx_status(TxStatus::Failed);
    let err = client.wait_for_tx(tx).await.unwrap_err();
    assert!(matches!(err, MarketError::Ledger(LedgerError::TxFailed { .. })));
}

#[tokio::test]
async fn test_order_book_and_lp_pairs() {
    let (mock, client) = setup();
    mock.set_read_handler("get_order_book", |args| {
        let yes = args[1] == ActionArg::Bool(true);
        Ok(if yes {
            vec![book_row("0xaaaa", 55, 100), book_row("0xbbbb", 0, 300)]
        } else {
            vec![book_row("0xaaaa", -45, 100), book_row("0xbbbb", -48, 100)]
        })
    });

    let yes = client.get_order_book(1, Outcome::Yes).await.unwrap();
    let no = client.get_order_book(1, Outcome::No).await.unwrap();
    assert_eq!(yes[0].kind, OrderKind::Sell);
    assert_eq!(yes[1].kind, OrderKind::Holding);
    assert_eq!(no[0].kind, OrderKind::Buy);

    let pairs = find_lp_pairs(&yes, &no);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].wallet_address, "0xaaaa");
}

#[tokio::test]
async fn test_market_lookup_by_hash() {
    let (mock, client) = setup();
    let err = client.market_exists(&[0u8; 31]).await.unwrap_err();
    assert_eq!(err.to_string(), "query_hash must be exactly 32 bytes");
    assert!(mock.reads().is_empty());

    assert!(!client.market_exists(&[1u8; 32]).await.unwrap());

    mock.set_read_rows(
        "get_market_by_hash",
        vec![Row::new()
            .with("id", 4)
            .with("hash", format!("0x{}", "01".repeat(32)))
            .with("query_components", format!("0x{}", "00".repeat(128)))
            .with("bridge", "sepolia_bridge")
            .with("settle_time", 100)
            .with("settled", true)
            .with("winning_outcome", false)
            .with("max_spread", 3)
            .with("min_order_size", 10)
            .with("created_at", 1)
            .with("creator", format!("0x{}", "11".repeat(20)))],
    );
    assert!(client.market_exists(&[1u8; 32]).await.unwrap());
    let info = client.get_market_by_hash(&[1u8; 32]).await.unwrap();
    assert_eq!(info.query_id, 4);
    assert_eq!(info.winning_outcome, Some(false));
}

#[tokio::test]
async fn test_market_exists_only_swallows_not_found() {
    let (mock, client) = setup();
    mock.set_read_error(
        "get_market_by_hash",
        LedgerError::from_node(-32000, "market not found"),
    );
    assert!(!client.market_exists(&[2u8; 32]).await.unwrap());

    let reset = LedgerError::Http("connection reset".to_string());
    mock.set_read_error("get_market_by_hash", reset);
    let err = client.market_exists(&[2u8; 32]).await.unwrap_err();
    assert!(matches!(err, MarketError::Ledger(LedgerError::Http(_))));
}

#[tokio::test]
async fn test_list_markets_args_and_decoding() {
    let (mock, client) = setup();
    mock.set_read_rows(
        "list_markets",
        vec![Row::new()
            .with("id", 1)
            .with("hash", format!("0x{}", "ab".repeat(32)))
            .with("settle_time", 100)
            .with("settled", false)
            .with("winning_outcome", Value::Null)
            .with("max_spread", 5)
            .with("min_order_size", 100)
            .with("created_at", 10)],
    );

    let markets = client
        .list_markets(Some(false), Some(10), None)
        .await
        .unwrap();
    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0].winning_outcome, None);

    let call = &mock.reads()[0];
    assert_eq!(
        call.args,
        vec![ActionArg::Bool(false), ActionArg::Int(10), ActionArg::Null]
    );
}

#[tokio::test]
async fn test_single_row_reads() {
    let (mock, client) = setup();

    let prices = client.get_best_prices(1, Outcome::Yes).await.unwrap();
    assert_eq!(prices.best_bid, None);
    assert!(client.get_distribution_summary(1).await.unwrap().is_none());
    assert!(matches!(
        client.get_market_info(9).await.unwrap_err(),
        MarketError::Ledger(LedgerError::NotFound(_))
    ));

    mock.set_read_rows(
        "validate_market_collateral",
        vec![Row::new()
            .with("valid_token_binaries", true)
            .with("valid_collateral", false)
            .with("total_true", 100)
            .with("total_false", 100)
            .with("vault_balance", "5000000000000000000")
            .with("expected_collateral", "6000000000000000000")
            .with("open_buys_value", 0)],
    );
    let validation = client.validate_market_collateral(1).await.unwrap();
    assert!(!validation.is_valid());
    assert_eq!(validation.vault_balance, "5000000000000000000");

    mock.set_read_rows(
        "get_user_collateral",
        vec![Row::new()
            .with("total_locked", "10")
            .with("buy_orders_locked", "4")
            .with("shares_value", "6")],
    );
    assert_eq!(
        client.get_user_collateral().await.unwrap().total_locked,
        "10"
    );
}

#[tokio::test]
async fn test_reward_reads() {
    let (mock, client) = setup();
    mock.set_read_rows(
        "get_distribution_details",
        vec![Row::new()
            .with("wallet_address", format!("0x{}", "cd".repeat(20)))
            .with("reward_amount", "1000")
            .with("total_reward_percent", "62.5")],
    );
    mock.set_read_rows(
        "get_participant_reward_history",
        vec![Row::new()
            .with("distribution_id", 2)
            .with("query_id", 1)
            .with("reward_amount", "1000")
            .with("total_reward_percent", "62.5")
            .with("distributed_at", 500)],
    );

    let details = client.get_distribution_details(2).await.unwrap();
    assert_eq!(details[0].total_reward_percent, "62.5");

    let history = client
        .get_participant_reward_history("0xCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCD")
        .await
        .unwrap();
    assert_eq!(history[0].distribution_id, 2);
    assert_eq!(
        mock.reads()[1].args[0],
        ActionArg::text("0xcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcd")
    );
}
