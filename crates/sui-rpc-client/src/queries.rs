//! Owned-coin queries and input coin preparation

use navi_core::serde_helpers::u64_from_str_or_num;
use navi_core::{Address, CoinType, ProtocolError, TxError};
use serde::Deserialize;
use sui_ptb::{prepare_coin, Coin, CoinObject, CoinSelectorError, TransactionBlock};

use crate::{Result, SuiClient};

/// Page size used when walking `suix_getCoins`
pub const COINS_PAGE_LIMIT: u32 = 50;

/// Upper bound on pages walked for one owner and coin type
const MAX_COIN_PAGES: usize = 40;

/// One page of `suix_getCoins`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<CoinObject>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Aggregate balance from `suix_getBalance`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub coin_type: CoinType,
    pub coin_object_count: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub total_balance: u64,
}

/// Fetch one page of coins owned by `owner`
pub async fn get_coins_page(
    client: &SuiClient,
    owner: &Address,
    coin_type: &CoinType,
    cursor: Option<&str>,
    limit: u32,
) -> Result<CoinPage> {
    client
        .call(
            "suix_getCoins",
            serde_json::json!([owner.as_str(), coin_type.as_str(), cursor, limit]),
        )
        .await
}

/// Fetch every coin object of `coin_type` owned by `owner`
pub async fn get_all_coins(
    client: &SuiClient,
    owner: &Address,
    coin_type: &CoinType,
) -> Result<Vec<CoinObject>> {
    let mut coins = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..MAX_COIN_PAGES {
        let page = get_coins_page(client, owner, coin_type, cursor.as_deref(), COINS_PAGE_LIMIT)
            .await?;
        coins.extend(page.data);
        if !page.has_next_page || page.next_cursor.is_none() {
            return Ok(coins);
        }
        cursor = page.next_cursor;
    }

    tracing::warn!(
        owner = %owner,
        coin_type = %coin_type,
        fetched = coins.len(),
        "Stopped paging coins at page limit"
    );
    Ok(coins)
}

pub async fn get_balance(
    client: &SuiClient,
    owner: &Address,
    coin_type: &CoinType,
) -> Result<CoinBalance> {
    client
        .call(
            "suix_getBalance",
            serde_json::json!([owner.as_str(), coin_type.as_str()]),
        )
        .await
}

/// Fetch `owner`'s coins and carve an input coin of `amount` out of them.
///
/// SUI never touches the fullnode; it is split from the gas coin.
pub async fn prepare_coin_for(
    client: &SuiClient,
    tx: &mut TransactionBlock,
    owner: &Address,
    coin_type: &CoinType,
    amount: u64,
) -> navi_core::Result<Coin> {
    let coins = if coin_type.is_sui() {
        Vec::new()
    } else {
        get_all_coins(client, owner, coin_type).await?
    };
    if !coin_type.is_sui() && coins.is_empty() {
        return Err(TxError::NoCoins.into());
    }
    prepare_coin(tx, &coins, coin_type, amount).map_err(selection_error)
}

fn selection_error(e: CoinSelectorError) -> navi_core::Error {
    match e {
        CoinSelectorError::InsufficientBalance {
            coin_type,
            required,
            available,
        } => ProtocolError::InsufficientBalance {
            coin_type,
            required,
            available,
        }
        .into(),
        other => TxError::BuildFailed {
            message: other.to_string(),
        }
        .into(),
    }
}
