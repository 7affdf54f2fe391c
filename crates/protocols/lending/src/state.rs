//! Lending State Types
//!
//! Errors, flash-loan receipts and reward claim descriptions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use navi_core::{Address, CoinType, ObjectId, ProtocolError, RpcError, TxError};
use sui_ptb::Argument;

/// Lending errors
#[derive(Debug, Error)]
pub enum LendingError {
    #[error("Unknown pool: {0}")]
    UnknownPool(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Coin {found} does not belong to pool {pool}")]
    CoinMismatch { pool: String, found: String },

    #[error("Package id unavailable: {0}")]
    PackageResolution(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),
}

impl From<navi_core::Error> for LendingError {
    fn from(err: navi_core::Error) -> Self {
        match err {
            navi_core::Error::Rpc(e) => Self::Rpc(e),
            navi_core::Error::Protocol(e) => Self::Protocol(e),
            navi_core::Error::Transaction(e) => Self::Transaction(e),
            navi_core::Error::Config(m) | navi_core::Error::Serialization(m) => {
                Self::PackageResolution(m)
            }
        }
    }
}

/// Outstanding flash loan. Must be handed back to `flash_repay` in the same
/// batch.
#[derive(Debug)]
#[must_use = "a flash loan receipt must be repaid in the same batch"]
pub struct FlashLoanReceipt {
    pub(crate) argument: Argument,
    pub(crate) coin_type: CoinType,
    pub(crate) amount: u64,
}

impl FlashLoanReceipt {
    pub fn coin_type(&self) -> &CoinType {
        &self.coin_type
    }

    /// Borrowed principal (fees are charged on repay)
    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Rewards of one coin across the assets and rules that accrued them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardClaim {
    pub reward_coin_type: CoinType,
    /// Reward fund object paying out `reward_coin_type`
    pub reward_fund: ObjectId,
    pub asset_coin_types: Vec<CoinType>,
    pub rule_ids: Vec<Address>,
}

impl RewardClaim {
    /// Coin types as the incentive module names them (no `0x` prefix)
    pub fn asset_type_names(&self) -> Vec<String> {
        self.asset_coin_types
            .iter()
            .map(|t| t.as_str().trim_start_matches("0x").to_string())
            .collect()
    }

    pub fn validate(&self) -> Result<(), LendingError> {
        if self.asset_coin_types.is_empty() {
            return Err(LendingError::InvalidAmount("reward claim names no assets".into()));
        }
        if self.asset_coin_types.len() != self.rule_ids.len() {
            return Err(LendingError::InvalidAmount(format!(
                "{} assets but {} rules",
                self.asset_coin_types.len(),
                self.rule_ids.len()
            )));
        }
        Ok(())
    }
}
