//! Aggregator State Types
//!
//! Quotes, paths and hops as the route builder consumes them, plus the
//! closed set of venues the SDK knows how to drive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use navi_core::{CoinType, ObjectId, RpcError, TxError};

/// Venue kinds the route builder can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VenueKind {
    #[serde(rename = "cetus")]
    Cetus,
    #[serde(rename = "turbos")]
    Turbos,
    #[serde(rename = "kriyaV2")]
    KriyaV2,
    #[serde(rename = "kriyaV3")]
    KriyaV3,
    #[serde(rename = "aftermath")]
    Aftermath,
    #[serde(rename = "deepbook")]
    Deepbook,
    #[serde(rename = "bluefin")]
    Bluefin,
    #[serde(rename = "vSui")]
    VSui,
    #[serde(rename = "haSui")]
    HaSui,
    #[serde(rename = "afSui")]
    AfSui,
}

impl VenueKind {
    pub const ALL: [VenueKind; 10] = [
        VenueKind::Cetus,
        VenueKind::Turbos,
        VenueKind::KriyaV2,
        VenueKind::KriyaV3,
        VenueKind::Aftermath,
        VenueKind::Deepbook,
        VenueKind::Bluefin,
        VenueKind::VSui,
        VenueKind::HaSui,
        VenueKind::AfSui,
    ];

    /// Provider tag used by the quote service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cetus => "cetus",
            Self::Turbos => "turbos",
            Self::KriyaV2 => "kriyaV2",
            Self::KriyaV3 => "kriyaV3",
            Self::Aftermath => "aftermath",
            Self::Deepbook => "deepbook",
            Self::Bluefin => "bluefin",
            Self::VSui => "vSui",
            Self::HaSui => "haSui",
            Self::AfSui => "afSui",
        }
    }

    /// Venues that lend the output first and take repayment afterwards
    pub fn is_flash_swap(&self) -> bool {
        matches!(self, Self::Cetus | Self::KriyaV3)
    }

    /// Stake/unstake venues (no price bound on-chain)
    pub fn is_liquid_staking(&self) -> bool {
        matches!(self, Self::VSui | Self::HaSui | Self::AfSui)
    }
}

impl fmt::Display for VenueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueKind {
    type Err = AggregatorError;

    /// Case-insensitive; `deepbookv3` is accepted as an alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "cetus" => Self::Cetus,
            "turbos" => Self::Turbos,
            "kriyav2" => Self::KriyaV2,
            "kriyav3" => Self::KriyaV3,
            "aftermath" => Self::Aftermath,
            "deepbook" | "deepbookv3" => Self::Deepbook,
            "bluefin" => Self::Bluefin,
            "vsui" => Self::VSui,
            "hasui" => Self::HaSui,
            "afsui" => Self::AfSui,
            _ => return Err(AggregatorError::UnsupportedVenue(s.to_string())),
        };
        Ok(kind)
    }
}

/// One swap step on one venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub venue: VenueKind,
    pub pool_id: ObjectId,
    pub from: CoinType,
    pub target: CoinType,
    /// Direction relative to the pool's own type parameter order
    pub a2b: bool,
    /// Pool type parameters, in the order the venue's Move functions expect
    pub type_arguments: Vec<CoinType>,
    pub amount_in: u64,
    pub amount_out: u64,
    /// Expected or minimum output for limit-based venues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<u64>,
}

impl Hop {
    /// Pool type parameter `index`, or a missing-field error
    pub fn type_argument(&self, index: usize) -> Result<&CoinType, AggregatorError> {
        self.type_arguments
            .get(index)
            .ok_or(AggregatorError::MissingHopField {
                venue: self.venue,
                field: "type_arguments",
            })
    }

    /// The pool's (A, B) pair
    pub fn pair(&self) -> Result<(&CoinType, &CoinType), AggregatorError> {
        Ok((self.type_argument(0)?, self.type_argument(1)?))
    }

    /// Check that `a2b` agrees with the pool pair found at type argument
    /// `offset`: a2b swaps A for B, otherwise B for A.
    pub fn check_pool_order(&self, offset: usize) -> Result<(), AggregatorError> {
        let a = self.type_argument(offset)?;
        let b = self.type_argument(offset + 1)?;
        let (pay, receive) = if self.a2b { (a, b) } else { (b, a) };
        if pay != &self.from || receive != &self.target {
            return Err(AggregatorError::HopDirectionMismatch {
                venue: self.venue,
                a2b: self.a2b,
                from: self.from.to_string(),
                target: self.target.to_string(),
            });
        }
        Ok(())
    }
}

/// Ordered hops carrying one slice of the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub hops: Vec<Hop>,
    pub amount_in: u64,
    /// Informational
    pub amount_out: u64,
}

/// A routing quote: every path starts at `from` and ends at `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub from: CoinType,
    pub target: CoinType,
    pub amount_in: u64,
    pub amount_out: u64,
    pub paths: Vec<Path>,
}

impl Quote {
    /// Check the quote's internal consistency.
    ///
    /// Path inputs must sum to `amount_in` and every path's hops must chain
    /// `from -> ... -> target`.
    pub fn validate(&self) -> Result<(), AggregatorError> {
        if self.paths.is_empty() {
            return Err(AggregatorError::NoRoutes {
                from: self.from.to_string(),
                target: self.target.to_string(),
            });
        }

        let total: u128 = self.paths.iter().map(|p| p.amount_in as u128).sum();
        if total != self.amount_in as u128 {
            return Err(AggregatorError::PathSumMismatch {
                expected: self.amount_in,
                actual: total,
            });
        }

        for (path_index, path) in self.paths.iter().enumerate() {
            if path.hops.is_empty() {
                return Err(AggregatorError::EmptyPath { path: path_index });
            }
            let mut expected = &self.from;
            for (hop_index, hop) in path.hops.iter().enumerate() {
                if &hop.from != expected {
                    return Err(AggregatorError::BrokenHopChain {
                        path: path_index,
                        hop: hop_index,
                        expected: expected.to_string(),
                        found: hop.from.to_string(),
                    });
                }
                expected = &hop.target;
            }
            if expected != &self.target {
                return Err(AggregatorError::BrokenHopChain {
                    path: path_index,
                    hop: path.hops.len(),
                    expected: self.target.to_string(),
                    found: expected.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn hop_count(&self) -> usize {
        self.paths.iter().map(|p| p.hops.len()).sum()
    }

    /// Every hop of every path, in path order
    pub fn hops(&self) -> impl Iterator<Item = &Hop> + '_ {
        self.paths.iter().flat_map(|p| &p.hops)
    }
}

/// Aggregator errors
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("No routes found from {from} to {target}")]
    NoRoutes { from: String, target: String },

    #[error("Path inputs sum to {actual}, quote amount_in is {expected}")]
    PathSumMismatch { expected: u64, actual: u128 },

    #[error("Path {path} has no hops")]
    EmptyPath { path: usize },

    #[error("Path {path} breaks at hop {hop}: expected {expected}, found {found}")]
    BrokenHopChain {
        path: usize,
        hop: usize,
        expected: String,
        found: String,
    },

    #[error("Unsupported venue: {0}")]
    UnsupportedVenue(String),

    #[error("No adapter registered for {0}")]
    MissingAdapter(VenueKind),

    #[error("Hop on {venue} is missing {field}")]
    MissingHopField {
        venue: VenueKind,
        field: &'static str,
    },

    #[error("Hop on {venue} swaps {from} -> {target}, which a2b={a2b} contradicts")]
    HopDirectionMismatch {
        venue: VenueKind,
        a2b: bool,
        from: String,
        target: String,
    },

    #[error("Input coin is {found}, quote expects {expected}")]
    InputCoinMismatch { expected: String, found: String },

    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    #[error("Direct fee and service fee cannot be combined")]
    ConflictingFeeOptions,

    #[error("Fee quote does not match the fee slice: {0}")]
    FeeQuoteMismatch(String),

    #[error("Price unavailable for {0}")]
    MissingPrice(String),

    #[error("Invalid service response: {0}")]
    InvalidResponse(String),

    #[error("Collaborator error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),
}
