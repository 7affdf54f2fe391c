//! Linear value handles
//!
//! `Coin` and `Balance` represent funds in flight inside one batch. Neither is
//! `Clone` or `Copy`: every operation that uses up a handle takes it by value,
//! and the owning [`TransactionBlock`](crate::TransactionBlock) tracks which
//! handles are still live.

use navi_core::CoinType;

use crate::transaction::Argument;

/// Builder-local identity of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HandleId(pub(crate) u32);

/// A `Coin<T>` value inside the batch
#[derive(Debug)]
#[must_use = "a coin handle must be merged, transferred or converted"]
pub struct Coin {
    id: HandleId,
    argument: Argument,
    coin_type: CoinType,
}

impl Coin {
    pub(crate) fn new(id: HandleId, argument: Argument, coin_type: CoinType) -> Self {
        Self {
            id,
            argument,
            coin_type,
        }
    }

    /// Argument for by-reference uses (`&Coin<T>` / `&mut Coin<T>` parameters)
    pub fn argument(&self) -> Argument {
        self.argument
    }

    pub fn coin_type(&self) -> &CoinType {
        &self.coin_type
    }

    pub(crate) fn into_parts(self) -> (HandleId, Argument, CoinType) {
        (self.id, self.argument, self.coin_type)
    }
}

/// A `Balance<T>` value inside the batch
#[derive(Debug)]
#[must_use = "a balance handle must be converted, repaid or destroyed"]
pub struct Balance {
    id: HandleId,
    argument: Argument,
    coin_type: CoinType,
}

impl Balance {
    pub(crate) fn new(id: HandleId, argument: Argument, coin_type: CoinType) -> Self {
        Self {
            id,
            argument,
            coin_type,
        }
    }

    pub fn argument(&self) -> Argument {
        self.argument
    }

    pub fn coin_type(&self) -> &CoinType {
        &self.coin_type
    }

    pub(crate) fn into_parts(self) -> (HandleId, Argument, CoinType) {
        (self.id, self.argument, self.coin_type)
    }
}
