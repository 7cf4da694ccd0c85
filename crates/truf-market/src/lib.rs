//! Binary prediction-market order book client for TRUF.NETWORK.
//!
//! Matching and settlement happen on the node. This crate is the gatekeeper
//! that keeps malformed orders off the network and the decoder for the
//! order book's read models:
//! - [`MarketClient`]: market creation, trading and reads over a ledger
//! - [`BinaryMarketQuery`]: query components for the four binary market types
//! - `validation`: local parameter rules, usable without a client
//! - `lp`: liquidity-provider pairing
//!
//! # Price convention
//!
//! Prices are integer cents. On the wire a negative price is a bid, a
//! positive price an ask, and zero a holding.

pub mod client;
pub mod error;
pub mod lp;
pub mod models;
pub mod query;
pub mod validation;

pub use client::{MarketClient, MarketParams};
pub use error::{MarketError, MarketResult};
pub use lp::{find_lp_pairs, is_lp_eligible, LpLeg, LpPair};
pub use models::{
    BestPrices, DepthLevel, DistributionSummary, LpRewardDetail, MarketInfo, MarketSummary,
    MarketValidation, OrderBookEntry, RewardHistory, UserCollateral, UserPosition,
};
pub use query::{BinaryCondition, BinaryMarketQuery};
