//! Coin object selection
//!
//! Picks owned coin objects to cover a required amount and turns them into a
//! single coin handle inside the batch.

use std::fmt;

use serde::{Deserialize, Serialize};

use navi_core::serde_helpers::u64_from_str_or_num;
use navi_core::{CoinType, ObjectId};

use crate::handle::Coin;
use crate::transaction::{Argument, TransactionBlock};

// =============================================================================
// Types
// =============================================================================

/// Owned coin object as returned by `suix_getCoins`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinObject {
    pub coin_type: CoinType,
    pub coin_object_id: ObjectId,
    pub version: String,
    pub digest: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub balance: u64,
}

/// Error returned when coin selection cannot satisfy requirements
#[derive(Debug, Clone)]
pub enum CoinSelectorError {
    InsufficientBalance {
        coin_type: String,
        required: u64,
        available: u64,
    },
    /// A coin of another type was passed in
    MixedCoinTypes { expected: String, found: String },
}

impl fmt::Display for CoinSelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSelectorError::InsufficientBalance {
                coin_type,
                required,
                available,
            } => write!(
                f,
                "Insufficient balance of {}: need {}, have {}",
                coin_type, required, available
            ),
            CoinSelectorError::MixedCoinTypes { expected, found } => {
                write!(f, "Expected coins of {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for CoinSelectorError {}

/// Result of coin selection: the minimum set of coins needed
#[derive(Debug, Clone)]
pub struct SelectedCoins {
    pub coins: Vec<CoinObject>,
    pub total: u64,
}

// =============================================================================
// Selection
// =============================================================================

/// Select the fewest coins covering `required`.
///
/// Sorts by balance descending (largest first) to minimize merge commands.
pub fn select_coins(
    coins: &[CoinObject],
    coin_type: &CoinType,
    required: u64,
) -> Result<SelectedCoins, CoinSelectorError> {
    if let Some(other) = coins.iter().find(|c| &c.coin_type != coin_type) {
        return Err(CoinSelectorError::MixedCoinTypes {
            expected: coin_type.to_string(),
            found: other.coin_type.to_string(),
        });
    }

    let mut sorted: Vec<&CoinObject> = coins.iter().filter(|c| c.balance > 0).collect();
    sorted.sort_by(|a, b| b.balance.cmp(&a.balance));

    let mut selected = Vec::new();
    let mut total: u64 = 0;
    for coin in sorted {
        if total >= required && !selected.is_empty() {
            break;
        }
        total = total.saturating_add(coin.balance);
        selected.push(coin.clone());
    }

    if total < required || selected.is_empty() {
        return Err(CoinSelectorError::InsufficientBalance {
            coin_type: coin_type.to_string(),
            required,
            available: total,
        });
    }

    Ok(SelectedCoins {
        coins: selected,
        total,
    })
}

/// Carve a coin handle of exactly `amount` out of the caller's balance.
///
/// SUI is split from the gas coin. Other types merge the selected coin objects
/// into the largest one and split `amount` from it; the merged coin object
/// stays with its owner.
pub fn prepare_coin(
    tx: &mut TransactionBlock,
    coins: &[CoinObject],
    coin_type: &CoinType,
    amount: u64,
) -> Result<Coin, CoinSelectorError> {
    if coin_type.is_sui() {
        return Ok(tx.split_coin(Argument::GasCoin, amount, coin_type));
    }

    let selected = select_coins(coins, coin_type, amount)?;
    let mut args: Vec<Argument> = selected
        .coins
        .iter()
        .map(|c| tx.object(&c.coin_object_id))
        .collect();
    let primary = args.remove(0);
    tx.merge_object_coins(primary, args);

    tracing::debug!(
        coin_type = %coin_type,
        merged = selected.coins.len(),
        amount,
        "Prepared input coin"
    );
    Ok(tx.split_coin(primary, amount, coin_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Command;
    use navi_core::Address;

    fn usdt() -> CoinType {
        CoinType::new("0xc060006111016b8a020ad5b33834984a437aaa7d3c74c18e09a95d48aceab08c::coin::COIN")
    }

    fn coin(id: &str, balance: u64) -> CoinObject {
        CoinObject {
            coin_type: usdt(),
            coin_object_id: ObjectId::new(id),
            version: "1".to_string(),
            digest: "digest".to_string(),
            balance,
        }
    }

    #[test]
    fn test_select_largest_first() {
        let coins = vec![coin("0x1", 10), coin("0x2", 500), coin("0x3", 40)];
        let selected = select_coins(&coins, &usdt(), 450).unwrap();
        assert_eq!(selected.coins.len(), 1);
        assert_eq!(selected.total, 500);

        let selected = select_coins(&coins, &usdt(), 520).unwrap();
        assert_eq!(selected.coins.len(), 2);
        assert_eq!(selected.total, 540);
    }

    #[test]
    fn test_insufficient_balance() {
        let coins = vec![coin("0x1", 10), coin("0x2", 20)];
        match select_coins(&coins, &usdt(), 31) {
            Err(CoinSelectorError::InsufficientBalance {
                required,
                available,
                ..
            }) => {
                assert_eq!(required, 31);
                assert_eq!(available, 30);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_mixed_types_rejected() {
        let mut coins = vec![coin("0x1", 10)];
        coins[0].coin_type = CoinType::sui();
        assert!(matches!(
            select_coins(&coins, &usdt(), 1),
            Err(CoinSelectorError::MixedCoinTypes { .. })
        ));
    }

    #[test]
    fn test_prepare_coin_merges_then_splits() {
        let coins = vec![coin("0x1", 100), coin("0x2", 300)];
        let mut tx = TransactionBlock::new();
        let handle = prepare_coin(&mut tx, &coins, &usdt(), 350).unwrap();
        tx.transfer_coins(vec![handle], &Address::new("0xa"));
        let ptb = tx.finish().unwrap();

        assert!(matches!(ptb.commands[0], Command::MergeCoins { .. }));
        assert!(matches!(ptb.commands[1], Command::SplitCoins { .. }));
    }

    #[test]
    fn test_prepare_sui_uses_gas() {
        let mut tx = TransactionBlock::new();
        let handle = prepare_coin(&mut tx, &[], &CoinType::sui(), 1_000).unwrap();
        assert_eq!(tx.commands().len(), 1);
        match &tx.commands()[0] {
            Command::SplitCoins { coin, .. } => assert_eq!(*coin, Argument::GasCoin),
            other => panic!("unexpected: {:?}", other),
        }
        tx.transfer_coins(vec![handle], &Address::new("0xa"));
    }
}
