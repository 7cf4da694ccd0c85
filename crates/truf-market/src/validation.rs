//! Order-book gatekeeper rules.
//!
//! Each check rejects parameters that the node would refuse, before any
//! network call. Prices are integer cents; the sign carries the side
//! (negative bid, positive ask, zero holding).

use truf_core::{
    Bridge, CoreError, MAX_MAX_SPREAD, MAX_PRICE_CENTS, MIN_MAX_SPREAD, MIN_PRICE_CENTS,
    QUERY_COMPONENTS_MIN_LEN, QUERY_HASH_LEN,
};

type Check<T = ()> = Result<T, CoreError>;

fn price_in_range(price: i32) -> bool {
    (MIN_PRICE_CENTS..=MAX_PRICE_CENTS).contains(&price)
}

fn positive_amount(field: &'static str, amount: i64) -> Check {
    if amount <= 0 {
        return Err(CoreError::invalid(field, format!("{field} must be positive")));
    }
    Ok(())
}

/// Market creation parameters. Returns the parsed bridge.
pub fn validate_create_market(
    bridge: &str,
    query_components: &[u8],
    max_spread: i32,
    min_order_size: i64,
) -> Check<Bridge> {
    let bridge: Bridge = bridge.parse()?;
    if query_components.len() < QUERY_COMPONENTS_MIN_LEN {
        return Err(CoreError::invalid(
            "query_components",
            "query_components too short for ABI-encoded tuple",
        ));
    }
    if !(MIN_MAX_SPREAD..=MAX_MAX_SPREAD).contains(&max_spread) {
        return Err(CoreError::invalid("max_spread", "max_spread must be between 1 and 50"));
    }
    positive_amount("min_order_size", min_order_size)?;
    Ok(bridge)
}

pub fn validate_query_hash(query_hash: &[u8]) -> Check {
    if query_hash.len() != QUERY_HASH_LEN {
        return Err(CoreError::invalid("query_hash", "query_hash must be exactly 32 bytes"));
    }
    Ok(())
}

/// `place_buy_order` and `place_sell_order` take an unsigned price.
pub fn validate_order(price: i32, amount: i64) -> Check {
    if !price_in_range(price) {
        return Err(CoreError::invalid("price", "price must be between 1 and 99 cents"));
    }
    positive_amount("amount", amount)
}

pub fn validate_split_limit_order(true_price: i32, amount: i64) -> Check {
    if !price_in_range(true_price) {
        return Err(CoreError::invalid("true_price", "true_price must be between 1 and 99 cents"));
    }
    positive_amount("amount", amount)
}

/// Cancel takes the signed price of the resting order. Holdings (price 0)
/// are not orders and must be sold instead.
pub fn validate_cancel(price: i32) -> Check {
    if price == 0 {
        return Err(CoreError::invalid(
            "price",
            "Cannot cancel holdings (price=0), use place_sell_order instead",
        ));
    }
    if !(-MAX_PRICE_CENTS..=MAX_PRICE_CENTS).contains(&price) {
        return Err(CoreError::invalid("price", "price must be between -99 and 99 (excluding 0)"));
    }
    Ok(())
}

pub fn validate_change_bid(old_price: i32, new_price: i32, new_amount: i64) -> Check {
    if old_price >= 0 || new_price >= 0 {
        return Err(CoreError::invalid("price", "bid prices must be negative (buy orders)"));
    }
    positive_amount("new_amount", new_amount)
}

pub fn validate_change_ask(old_price: i32, new_price: i32, new_amount: i64) -> Check {
    if old_price < 0 || new_price < 0 {
        return Err(CoreError::invalid("price", "ask prices must be positive (sell orders)"));
    }
    positive_amount("new_amount", new_amount)
}
