//! Lending Client
//!
//! Resolves the current package through [`PackageIdCache`] and pulls input
//! coins out of the user's wallet before handing off to [`LendingTxBuilder`].

use std::time::Duration;

use navi_core::{Address, CoinType, ObjectId, SdkConfig};
use sui_ptb::{Coin, TransactionBlock};
use sui_rpc_client::{queries::prepare_coin_for, SuiClient};

use crate::constants::{get_pool, protocol, volo};
use crate::package::{OpenApiPackageSource, PackageIdCache, PackageSource};
use crate::state::LendingError;
use crate::tx_builder::LendingTxBuilder;

pub struct LendingClient<S> {
    rpc: SuiClient,
    packages: PackageIdCache<S>,
}

impl LendingClient<OpenApiPackageSource> {
    pub fn from_config(config: &SdkConfig) -> Result<Self, LendingError> {
        let source = OpenApiPackageSource::new(&config.protocol, config.rpc.request_timeout_secs)?;
        let packages = PackageIdCache::with_fallback(
            source,
            Duration::from_secs(config.protocol.package_ttl_secs),
            ObjectId::new(protocol::FALLBACK_PACKAGE),
        );
        Ok(Self::new(SuiClient::new(config.rpc.clone())?, packages))
    }
}

impl<S: PackageSource> LendingClient<S> {
    pub fn new(rpc: SuiClient, packages: PackageIdCache<S>) -> Self {
        Self { rpc, packages }
    }

    pub fn rpc(&self) -> &SuiClient {
        &self.rpc
    }

    pub fn packages(&self) -> &PackageIdCache<S> {
        &self.packages
    }

    /// Builder bound to the current package id
    pub async fn builder(&self) -> Result<LendingTxBuilder, LendingError> {
        let package = self.packages.get_or_refresh().await?;
        Ok(LendingTxBuilder::new(package))
    }

    async fn wallet_coin(
        &self,
        tx: &mut TransactionBlock,
        owner: &Address,
        coin_type: &CoinType,
        amount: u64,
    ) -> Result<Coin, LendingError> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount("amount must be positive".into()));
        }
        Ok(prepare_coin_for(&self.rpc, tx, owner, coin_type, amount).await?)
    }

    /// Deposit `amount` of the pool's coin from `owner`'s wallet
    pub async fn deposit_from_wallet(
        &self,
        tx: &mut TransactionBlock,
        owner: &Address,
        symbol: &str,
        amount: u64,
    ) -> Result<(), LendingError> {
        let pool = get_pool(symbol).ok_or_else(|| LendingError::UnknownPool(symbol.into()))?;
        let builder = self.builder().await?;
        let coin = self
            .wallet_coin(tx, owner, &CoinType::new(pool.coin_type), amount)
            .await?;
        builder.deposit(tx, symbol, coin)
    }

    /// Repay `amount` of debt from `owner`'s wallet
    pub async fn repay_from_wallet(
        &self,
        tx: &mut TransactionBlock,
        owner: &Address,
        symbol: &str,
        amount: u64,
    ) -> Result<(), LendingError> {
        let pool = get_pool(symbol).ok_or_else(|| LendingError::UnknownPool(symbol.into()))?;
        let builder = self.builder().await?;
        let coin = self
            .wallet_coin(tx, owner, &CoinType::new(pool.coin_type), amount)
            .await?;
        builder.repay(tx, symbol, coin)
    }

    /// Stake `amount` SUI from the gas coin and send the vSui to `owner`
    pub async fn stake_vsui_from_wallet(
        &self,
        tx: &mut TransactionBlock,
        owner: &Address,
        amount: u64,
    ) -> Result<(), LendingError> {
        if amount < volo::MIN_STAKE_MIST {
            return Err(LendingError::InvalidAmount(format!(
                "stake of {} is below the minimum of {}",
                amount,
                volo::MIN_STAKE_MIST
            )));
        }
        let builder = self.builder().await?;
        let sui = self.wallet_coin(tx, owner, &CoinType::sui(), amount).await?;
        let vsui = builder.stake_vsui(tx, sui)?;
        tx.transfer_coins(vec![vsui], owner);
        Ok(())
    }
}
