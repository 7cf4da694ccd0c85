//! Liquidity-provider reward eligibility.
//!
//! A participant provides liquidity by holding a YES sell at `P` and a NO
//! buy at `100 - P` for the same amount; together the two legs quote both
//! sides of the market.

use serde::Serialize;
use truf_core::{OrderKind, PRICE_SUM_CENTS};

use crate::models::OrderBookEntry;

/// One side of a potential LP pair. `price` is in cents; a buy leg may carry
/// the wire sign (negative) or its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LpLeg {
    pub price: i32,
    pub amount: i64,
}

impl LpLeg {
    pub fn new(price: i32, amount: i64) -> Self {
        Self { price, amount }
    }
}

/// A YES sell and NO buy from one wallet that qualify for LP rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LpPair {
    pub wallet_address: String,
    pub yes_sell_price: i32,
    /// Magnitude of the NO bid.
    pub no_buy_price: i32,
    pub amount: i64,
}

/// Whether a YES sell and a NO buy form an eligible pair: prices sum to 100
/// and amounts match.
pub fn is_lp_eligible(yes_sell: LpLeg, no_buy: LpLeg) -> bool {
    let sell = yes_sell.price;
    let buy = no_buy.price.abs();
    sell > 0
        && buy > 0
        && sell + buy == PRICE_SUM_CENTS
        && yes_sell.amount > 0
        && yes_sell.amount == no_buy.amount
}

/// Match YES sells against NO buys of the same wallet.
///
/// `yes_book` and `no_book` are the order books of the two outcomes. Each
/// NO buy is used at most once.
pub fn find_lp_pairs(yes_book: &[OrderBookEntry], no_book: &[OrderBookEntry]) -> Vec<LpPair> {
    let mut used = vec![false; no_book.len()];
    let mut pairs = Vec::new();

    for sell in yes_book.iter().filter(|e| e.kind == OrderKind::Sell) {
        let matched = no_book.iter().enumerate().find(|(idx, buy)| {
            !used[*idx]
                && buy.kind == OrderKind::Buy
                && buy.wallet_address == sell.wallet_address
                && is_lp_eligible(
                    LpLeg::new(sell.price, sell.amount),
                    LpLeg::new(buy.price, buy.amount),
                )
        });
        if let Some((idx, buy)) = matched {
            used[idx] = true;
            pairs.push(LpPair {
                wallet_address: sell.wallet_address.clone(),
                yes_sell_price: sell.price,
                no_buy_price: buy.price.abs(),
                amount: sell.amount,
            });
        }
    }
    pairs
}
