//! sui-ptb: Programmable transaction building for Sui
//!
//! Provides the batch builder, linear coin/balance handles and coin selection.

pub mod coin_selection;
pub mod handle;
pub mod transaction;

pub use coin_selection::{
    prepare_coin, select_coins, CoinObject, CoinSelectorError, SelectedCoins,
};
pub use handle::{Balance, Coin};
pub use transaction::*;
