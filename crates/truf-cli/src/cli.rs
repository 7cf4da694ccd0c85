//! Command-line surface.

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use truf_codec::ActionArg;
use truf_core::{FeeMode, Outcome};

/// TRUF.NETWORK attestation and prediction-market client
#[derive(Parser, Debug)]
#[command(name = "truf", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (can also be set via TRUF_CONFIG env var)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Print Prometheus metrics to stderr on exit
    #[arg(long, global = true)]
    pub metrics: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered attestable actions
    Actions,

    /// Attestation requests, retrieval and verification
    #[command(subcommand)]
    Attestation(AttestationCommand),

    /// Prediction-market order book
    #[command(subcommand)]
    Market(MarketCommand),

    /// Transaction ledger reads
    #[command(subcommand)]
    Tx(TxCommand),
}

impl Command {
    /// Commands that work on local input only.
    pub fn is_offline(&self) -> bool {
        match self {
            Self::Actions => true,
            Self::Attestation(cmd) => matches!(
                cmd,
                AttestationCommand::Verify { .. } | AttestationCommand::Parse { .. }
            ),
            Self::Market(cmd) => matches!(
                cmd,
                MarketCommand::Encode(_) | MarketCommand::Decode { .. }
            ),
            Self::Tx(_) => false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AttestationCommand {
    /// Request a signed attestation of an action's result
    Request {
        #[arg(long)]
        data_provider: String,
        #[arg(long)]
        stream_id: String,
        /// Action to attest, e.g. get_record
        #[arg(long)]
        action: String,
        /// Action argument as KIND:VALUE (null, bool, int, text, numeric, bytes)
        #[arg(long = "arg", value_name = "KIND:VALUE")]
        args: Vec<CliArg>,
        /// Max fee in base units (defaults to attestation.default_max_fee)
        #[arg(long)]
        max_fee: Option<String>,
        /// Wait for the request transaction to be final
        #[arg(long)]
        wait: bool,
        /// Also poll until a validator has signed
        #[arg(long)]
        wait_signature: bool,
    },

    /// Fetch the current payload for a request
    Get { request_tx_id: String },

    /// Pending or signed
    Status { request_tx_id: String },

    /// Poll until the payload is signed
    Wait { request_tx_id: String },

    /// List attestation requests
    List {
        /// Requester address (hex)
        #[arg(long)]
        requester: Option<HexBytes>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
        /// e.g. "created_height desc"
        #[arg(long)]
        order_by: Option<String>,
    },

    /// Recover the validator address from a signed payload
    Verify { payload: HexBytes },

    /// Decode a canonical payload
    Parse {
        payload: HexBytes,
        /// Decode the result as a binary action's boolean
        #[arg(long)]
        boolean: bool,
    },
}

/// Market parameters shared by the creation commands.
#[derive(Args, Debug, Clone)]
pub struct MarketParamsArgs {
    /// Collateral bridge (hoodi_tt2, sepolia_bridge, ethereum_bridge)
    #[arg(long)]
    pub bridge: String,
    /// Unix timestamp after which the market can settle
    #[arg(long)]
    pub settle_time: i64,
    /// Widest spread (cents) that earns LP rewards
    #[arg(long, default_value_t = 5)]
    pub max_spread: i32,
    #[arg(long, default_value_t = 100)]
    pub min_order_size: i64,
}

/// A binary condition on one stream value.
#[derive(Args, Debug, Clone)]
pub struct BinaryMarketArgs {
    #[arg(long, value_enum)]
    pub condition: ConditionKind,
    #[arg(long)]
    pub data_provider: String,
    #[arg(long)]
    pub stream_id: String,
    /// Timestamp the condition is evaluated at
    #[arg(long)]
    pub timestamp: i64,
    /// Threshold for above/below, min for range, target for equals
    #[arg(long)]
    pub value: String,
    /// Max for range, tolerance for equals
    #[arg(long)]
    pub second_value: Option<String>,
    /// Only consider data inserted at or before this block
    #[arg(long)]
    pub frozen_at: Option<i64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Above,
    Below,
    Range,
    Equals,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeArg {
    Yes,
    No,
}

impl From<OutcomeArg> for Outcome {
    fn from(value: OutcomeArg) -> Self {
        match value {
            OutcomeArg::Yes => Outcome::Yes,
            OutcomeArg::No => Outcome::No,
        }
    }
}

/// Market and outcome selector.
#[derive(Args, Debug, Clone, Copy)]
pub struct BookArgs {
    #[arg(long)]
    pub query_id: i64,
    #[arg(long, value_enum)]
    pub outcome: OutcomeArg,
}

#[derive(Subcommand, Debug)]
pub enum MarketCommand {
    /// Create a market from raw query components
    Create {
        #[arg(long)]
        query_components: HexBytes,
        #[command(flatten)]
        params: MarketParamsArgs,
        #[arg(long)]
        wait: bool,
    },
    /// Create a binary market on a stream value
    CreateBinary {
        #[command(flatten)]
        market: BinaryMarketArgs,
        #[command(flatten)]
        params: MarketParamsArgs,
        #[arg(long)]
        wait: bool,
    },
    /// Print the query components for a binary condition
    Encode(BinaryMarketArgs),
    /// Decode query components into market data
    Decode { query_components: HexBytes },

    /// Bid for shares at an unsigned price in cents
    Buy {
        #[command(flatten)]
        book: BookArgs,
        #[arg(long)]
        price: i32,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        wait: bool,
    },
    /// Offer held shares at an unsigned price in cents
    Sell {
        #[command(flatten)]
        book: BookArgs,
        #[arg(long)]
        price: i32,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        wait: bool,
    },
    /// Mint pairs, keep YES and offer NO at 100 - true_price
    Split {
        #[arg(long)]
        query_id: i64,
        #[arg(long)]
        true_price: i32,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        wait: bool,
    },
    /// Cancel the order at a signed price
    Cancel {
        #[command(flatten)]
        book: BookArgs,
        #[arg(long, allow_hyphen_values = true)]
        price: i32,
        #[arg(long)]
        wait: bool,
    },
    /// Move a bid (negative prices)
    ChangeBid {
        #[command(flatten)]
        book: BookArgs,
        #[command(flatten)]
        change: ChangeArgs,
    },
    /// Move an ask
    ChangeAsk {
        #[command(flatten)]
        book: BookArgs,
        #[command(flatten)]
        change: ChangeArgs,
    },
    /// Settle a market from its attestation
    Settle {
        #[arg(long)]
        query_id: i64,
        #[arg(long)]
        wait: bool,
    },

    Info {
        #[arg(long)]
        query_id: Option<i64>,
        /// Look up by 32-byte query hash instead
        #[arg(long, conflicts_with = "query_id")]
        hash: Option<HexBytes>,
    },
    List {
        #[arg(long)]
        settled: Option<bool>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    Book(BookArgs),
    Depth(BookArgs),
    Best(BookArgs),
    Positions,
    Collateral,
    /// Check a market's collateral invariants
    Validate {
        #[arg(long)]
        query_id: i64,
    },
    /// YES sells and NO buys from one wallet that qualify for LP rewards
    LpPairs {
        #[arg(long)]
        query_id: i64,
    },
    Rewards {
        #[command(subcommand)]
        command: RewardsCommand,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ChangeArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub old_price: i32,
    #[arg(long, allow_hyphen_values = true)]
    pub new_price: i32,
    #[arg(long)]
    pub new_amount: i64,
    #[arg(long)]
    pub wait: bool,
}

#[derive(Subcommand, Debug)]
pub enum RewardsCommand {
    /// Latest fee distribution for a market
    Summary {
        #[arg(long)]
        query_id: i64,
    },
    Details {
        #[arg(long)]
        distribution_id: i64,
    },
    History {
        #[arg(long)]
        wallet: String,
    },
    /// Record an LP reward sample
    Sample {
        #[arg(long)]
        query_id: i64,
        #[arg(long)]
        block: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    /// A transaction and its fee distributions
    Event { tx_id: String },
    /// Fee history of a wallet
    Fees {
        wallet: String,
        #[arg(long, default_value = "paid")]
        mode: FeeMode,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
}

/// Bytes given as hex, `0x` prefix optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        hex::decode(bare).map(Self)
    }
}

/// Typed action argument written as `KIND:VALUE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArg(pub ActionArg);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgError(String);

impl fmt::Display for CliArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CliArgError {}

impl FromStr for CliArg {
    type Err = CliArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "null" {
            return Ok(Self(ActionArg::Null));
        }
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| CliArgError(format!("expected KIND:VALUE, got '{s}'")))?;
        let bad = |e: &dyn fmt::Display| CliArgError(format!("invalid {kind} '{value}': {e}"));
        let arg = match kind {
            "bool" => ActionArg::Bool(value.parse().map_err(|e| bad(&e))?),
            "int" => ActionArg::Int(value.parse().map_err(|e| bad(&e))?),
            "text" => ActionArg::text(value),
            "numeric" => ActionArg::Numeric(Decimal::from_str(value).map_err(|e| bad(&e))?),
            "bytes" => ActionArg::Bytes(HexBytes::from_str(value).map_err(|e| bad(&e))?.0),
            other => {
                return Err(CliArgError(format!(
                    "unknown argument kind '{other}' (null, bool, int, text, numeric, bytes)"
                )))
            }
        };
        Ok(Self(arg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_arg_kinds() {
        let parse = |s: &str| s.parse::<CliArg>().unwrap().0;
        assert_eq!(parse("null"), ActionArg::Null);
        assert_eq!(parse("bool:true"), ActionArg::Bool(true));
        assert_eq!(parse("int:-7"), ActionArg::Int(-7));
        assert_eq!(parse("text:a:b"), ActionArg::text("a:b"));
        assert_eq!(parse("numeric:1.50"), ActionArg::Numeric(dec!(1.50)));
        assert_eq!(parse("bytes:0xdead"), ActionArg::Bytes(vec![0xde, 0xad]));

        assert!("int:x".parse::<CliArg>().is_err());
        assert!("float:1".parse::<CliArg>().is_err());
        assert!("plain".parse::<CliArg>().is_err());
    }

    #[test]
    fn test_hex_bytes() {
        assert_eq!("0xABcd".parse::<HexBytes>().unwrap().0, vec![0xab, 0xcd]);
        assert_eq!("abcd".parse::<HexBytes>().unwrap().0, vec![0xab, 0xcd]);
        assert!("0xabc".parse::<HexBytes>().is_err());
    }

    #[test]
    fn test_parse_attestation_request() {
        let cli = Cli::try_parse_from([
            "truf",
            "attestation",
            "request",
            "--data-provider",
            "0x4710a8d8f0d845da110086812a32de6d90d7ff5c",
            "--stream-id",
            "stai0000000000000000000000000000",
            "--action",
            "get_record",
            "--arg",
            "text:0x4710a8d8f0d845da110086812a32de6d90d7ff5c",
            "--arg",
            "int:100",
            "--arg",
            "null",
            "--wait",
        ])
        .unwrap();

        assert!(!cli.command.is_offline());
        match cli.command {
            Command::Attestation(AttestationCommand::Request {
                args, wait, max_fee, ..
            }) => {
                assert_eq!(args.len(), 3);
                assert_eq!(args[1].0, ActionArg::Int(100));
                assert!(wait);
                assert!(max_fee.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_signed_prices() {
        let cli = Cli::try_parse_from([
            "truf",
            "market",
            "change-bid",
            "--query-id",
            "3",
            "--outcome",
            "no",
            "--old-price",
            "-40",
            "--new-price",
            "-45",
            "--new-amount",
            "10",
        ])
        .unwrap();
        match cli.command {
            Command::Market(MarketCommand::ChangeBid { book, change }) => {
                assert_eq!(Outcome::from(book.outcome), Outcome::No);
                assert_eq!(change.old_price, -40);
                assert_eq!(change.new_price, -45);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_offline_commands() {
        let cli = Cli::try_parse_from(["truf", "attestation", "verify", "0x00"]).unwrap();
        assert!(cli.command.is_offline());
        let cli = Cli::try_parse_from(["truf", "--config", "x.toml", "actions"]).unwrap();
        assert!(cli.command.is_offline());
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
        let cli = Cli::try_parse_from(["truf", "tx", "fees", "0xabc", "--mode", "both"]).unwrap();
        assert!(!cli.command.is_offline());
    }

    #[test]
    fn test_bad_fee_mode_rejected() {
        assert!(Cli::try_parse_from(["truf", "tx", "fees", "0xabc", "--mode", "all"]).is_err());
    }
}
