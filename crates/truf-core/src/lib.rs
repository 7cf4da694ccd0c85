//! Core domain types for the TRUF.NETWORK client.
//!
//! This crate provides the vocabulary shared by every other crate:
//! - `StreamId`, `StreamLocator`: stream identification and address validation
//! - `Action`: the closed registry of attestable actions
//! - `Outcome`, `OrderKind`: signed-price order classification
//! - `Bridge`, `MarketState`: market wire vocabulary and lifecycle
//! - `AttestationOrderBy`, `FeeMode`: closed enums for list queries

pub mod action;
pub mod attestation;
pub mod error;
pub mod market;
pub mod order;
pub mod stream;
pub mod transaction;

pub use action::{
    action_registry, get_action_id, get_action_name, is_binary_action, is_binary_action_id,
    validate_action_name, Action, ActionInfo, MarketType,
};
pub use attestation::{AttestationOrderBy, MAX_ATTESTATION_LIST_LIMIT, MAX_REQUESTER_LEN};
pub use error::{CoreError, Result};
pub use market::{
    Bridge, MarketState, MAX_MAX_SPREAD, MIN_MAX_SPREAD, QUERY_COMPONENTS_MIN_LEN, QUERY_HASH_LEN,
};
pub use order::{OrderKind, Outcome, MAX_PRICE_CENTS, MIN_PRICE_CENTS, PRICE_SUM_CENTS};
pub use stream::{
    parse_data_provider, validate_data_provider, validate_stream_id, StreamId, StreamLocator,
    DATA_PROVIDER_LEN, STREAM_ID_LEN,
};
pub use transaction::{FeeMode, MAX_FEE_LIST_LIMIT};
