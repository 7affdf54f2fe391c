//! Lending Transaction Builder
//!
//! Appends lending protocol calls to a caller-owned batch. Every entry point
//! checks its inputs before emitting anything, so a failed call leaves the
//! batch untouched.
//!
//! Provided operations:
//! - deposit / withdraw / borrow / repay
//! - flash loan and flash repay
//! - liquidation
//! - reward claims
//! - vSui stake / unstake

use navi_core::constants::{CLOCK_OBJECT_ID, SYSTEM_STATE_OBJECT_ID};
use navi_core::{Address, CoinType, ObjectId};
use sui_ptb::{Balance, Coin, MoveCall, PureValue, TransactionBlock};

use crate::constants::{get_pool, protocol, volo, PoolConfig};
use crate::state::{FlashLoanReceipt, LendingError, RewardClaim};

/// Shared objects every lending call touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingObjects {
    pub storage: ObjectId,
    pub incentive_v2: ObjectId,
    pub incentive_v3: ObjectId,
    pub price_oracle: ObjectId,
    pub flashloan_config: ObjectId,
}

impl LendingObjects {
    pub fn mainnet() -> Self {
        Self {
            storage: ObjectId::new(protocol::STORAGE),
            incentive_v2: ObjectId::new(protocol::INCENTIVE_V2),
            incentive_v3: ObjectId::new(protocol::INCENTIVE_V3),
            price_oracle: ObjectId::new(protocol::PRICE_ORACLE),
            flashloan_config: ObjectId::new(protocol::FLASHLOAN_CONFIG),
        }
    }
}

/// Builder bound to one resolved protocol package
#[derive(Debug, Clone)]
pub struct LendingTxBuilder {
    package: ObjectId,
    objects: LendingObjects,
}

fn pool(symbol: &str) -> Result<&'static PoolConfig, LendingError> {
    get_pool(symbol).ok_or_else(|| LendingError::UnknownPool(symbol.to_string()))
}

fn check_coin(pool: &PoolConfig, coin_type: &CoinType) -> Result<(), LendingError> {
    if CoinType::new(pool.coin_type) != *coin_type {
        return Err(LendingError::CoinMismatch {
            pool: pool.symbol.to_string(),
            found: coin_type.to_string(),
        });
    }
    Ok(())
}

fn check_amount(amount: u64) -> Result<(), LendingError> {
    if amount == 0 {
        return Err(LendingError::InvalidAmount("amount must be positive".into()));
    }
    Ok(())
}

impl LendingTxBuilder {
    pub fn new(package: ObjectId) -> Self {
        Self {
            package,
            objects: LendingObjects::mainnet(),
        }
    }

    pub fn with_objects(package: ObjectId, objects: LendingObjects) -> Self {
        Self { package, objects }
    }

    pub fn package(&self) -> &ObjectId {
        &self.package
    }

    fn incentive_call(&self, function: &str, type_args: &[&str]) -> MoveCall {
        MoveCall::new(&self.package, protocol::INCENTIVE_MODULE, function)
            .type_args(type_args.iter().copied())
    }

    /// Deposit the whole of `coin` into its pool
    pub fn deposit(
        &self,
        tx: &mut TransactionBlock,
        symbol: &str,
        coin: Coin,
    ) -> Result<(), LendingError> {
        let pool = pool(symbol)?;
        check_coin(pool, coin.coin_type())?;

        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let storage = tx.object(&self.objects.storage);
        let pool_obj = tx.object(&ObjectId::new(pool.pool_id));
        let asset = tx.pure_u8(pool.asset_id);
        let amount = tx.coin_value(&coin);
        let coin = tx.consume_coin(coin);
        let incentive_v2 = tx.object(&self.objects.incentive_v2);
        let incentive_v3 = tx.object(&self.objects.incentive_v3);
        tx.move_call(
            self.incentive_call("entry_deposit", &[pool.coin_type]).args([
                clock,
                storage,
                pool_obj,
                asset,
                coin,
                amount,
                incentive_v2,
                incentive_v3,
            ]),
        );
        tracing::debug!(pool = pool.symbol, "Deposit emitted");
        Ok(())
    }

    /// Shared shape of withdraw and borrow: returns a `Balance<T>` which is
    /// turned into a coin
    fn draw(
        &self,
        tx: &mut TransactionBlock,
        function: &str,
        symbol: &str,
        amount: u64,
    ) -> Result<Coin, LendingError> {
        let pool = pool(symbol)?;
        check_amount(amount)?;

        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let oracle = tx.immutable_object(&self.objects.price_oracle);
        let storage = tx.object(&self.objects.storage);
        let pool_obj = tx.object(&ObjectId::new(pool.pool_id));
        let asset = tx.pure_u8(pool.asset_id);
        let amount_arg = tx.pure_u64(amount);
        let incentive_v2 = tx.object(&self.objects.incentive_v2);
        let incentive_v3 = tx.object(&self.objects.incentive_v3);
        let result = tx.move_call(self.incentive_call(function, &[pool.coin_type]).args([
            clock,
            oracle,
            storage,
            pool_obj,
            asset,
            amount_arg,
            incentive_v2,
            incentive_v3,
        ]));

        let coin_type = CoinType::new(pool.coin_type);
        let balance = tx.adopt_balance(result.single(), &coin_type);
        tracing::debug!(pool = pool.symbol, amount, function, "Draw emitted");
        Ok(tx.balance_into_coin(balance))
    }

    /// Withdraw `amount` of supplied collateral
    pub fn withdraw(
        &self,
        tx: &mut TransactionBlock,
        symbol: &str,
        amount: u64,
    ) -> Result<Coin, LendingError> {
        self.draw(tx, "withdraw", symbol, amount)
    }

    pub fn borrow(
        &self,
        tx: &mut TransactionBlock,
        symbol: &str,
        amount: u64,
    ) -> Result<Coin, LendingError> {
        self.draw(tx, "borrow", symbol, amount)
    }

    /// Repay debt with the whole of `coin`; any excess is refunded on-chain
    pub fn repay(
        &self,
        tx: &mut TransactionBlock,
        symbol: &str,
        coin: Coin,
    ) -> Result<(), LendingError> {
        let pool = pool(symbol)?;
        check_coin(pool, coin.coin_type())?;

        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let oracle = tx.immutable_object(&self.objects.price_oracle);
        let storage = tx.object(&self.objects.storage);
        let pool_obj = tx.object(&ObjectId::new(pool.pool_id));
        let asset = tx.pure_u8(pool.asset_id);
        let amount = tx.coin_value(&coin);
        let coin = tx.consume_coin(coin);
        let incentive_v2 = tx.object(&self.objects.incentive_v2);
        let incentive_v3 = tx.object(&self.objects.incentive_v3);
        tx.move_call(self.incentive_call("entry_repay", &[pool.coin_type]).args([
            clock,
            oracle,
            storage,
            pool_obj,
            asset,
            coin,
            amount,
            incentive_v2,
            incentive_v3,
        ]));
        tracing::debug!(pool = pool.symbol, "Repay emitted");
        Ok(())
    }

    /// Borrow `amount` for the duration of the batch
    pub fn flash_loan(
        &self,
        tx: &mut TransactionBlock,
        symbol: &str,
        amount: u64,
    ) -> Result<(Balance, FlashLoanReceipt), LendingError> {
        let pool = pool(symbol)?;
        check_amount(amount)?;

        let config = tx.immutable_object(&self.objects.flashloan_config);
        let pool_obj = tx.object(&ObjectId::new(pool.pool_id));
        let amount_arg = tx.pure_u64(amount);
        let result = tx.move_call(
            MoveCall::new(&self.package, protocol::LENDING_MODULE, "flash_loan_with_ctx")
                .type_args([pool.coin_type])
                .args([config, pool_obj, amount_arg]),
        );

        let coin_type = CoinType::new(pool.coin_type);
        let balance = tx.adopt_balance(result.nested(0), &coin_type);
        let receipt = FlashLoanReceipt {
            argument: result.nested(1),
            coin_type,
            amount,
        };
        tracing::debug!(pool = pool.symbol, amount, "Flash loan emitted");
        Ok((balance, receipt))
    }

    /// Repay a flash loan; returns whatever `repayment` held beyond principal
    /// plus fee
    pub fn flash_repay(
        &self,
        tx: &mut TransactionBlock,
        receipt: FlashLoanReceipt,
        repayment: Balance,
    ) -> Result<Balance, LendingError> {
        if repayment.coin_type() != receipt.coin_type() {
            return Err(LendingError::CoinMismatch {
                pool: receipt.coin_type.to_string(),
                found: repayment.coin_type().to_string(),
            });
        }
        let pool = crate::constants::get_pool_by_coin_type(&receipt.coin_type)
            .ok_or_else(|| LendingError::UnknownPool(receipt.coin_type.to_string()))?;

        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let storage = tx.object(&self.objects.storage);
        let pool_obj = tx.object(&ObjectId::new(pool.pool_id));
        let repayment = tx.consume_balance(repayment);
        let result = tx.move_call(
            MoveCall::new(&self.package, protocol::LENDING_MODULE, "flash_repay_with_ctx")
                .type_args([pool.coin_type])
                .args([clock, storage, pool_obj, receipt.argument, repayment]),
        );
        Ok(tx.adopt_balance(result.single(), &receipt.coin_type))
    }

    /// Liquidate `borrower`, paying with `debt_coin`.
    ///
    /// Returns `(collateral, unused debt)` as coins.
    pub fn liquidate(
        &self,
        tx: &mut TransactionBlock,
        debt_symbol: &str,
        debt_coin: Coin,
        collateral_symbol: &str,
        borrower: &Address,
    ) -> Result<(Coin, Coin), LendingError> {
        let debt_pool = pool(debt_symbol)?;
        let collateral_pool = pool(collateral_symbol)?;
        check_coin(debt_pool, debt_coin.coin_type())?;

        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let oracle = tx.immutable_object(&self.objects.price_oracle);
        let storage = tx.object(&self.objects.storage);
        let debt_asset = tx.pure_u8(debt_pool.asset_id);
        let debt_pool_obj = tx.object(&ObjectId::new(debt_pool.pool_id));
        let debt_balance = tx.coin_into_balance(debt_coin);
        let debt_balance = tx.consume_balance(debt_balance);
        let collateral_asset = tx.pure_u8(collateral_pool.asset_id);
        let collateral_pool_obj = tx.object(&ObjectId::new(collateral_pool.pool_id));
        let borrower = tx.pure_address(borrower);
        let incentive_v2 = tx.object(&self.objects.incentive_v2);
        let incentive_v3 = tx.object(&self.objects.incentive_v3);

        let result = tx.move_call(
            self.incentive_call("liquidation", &[debt_pool.coin_type, collateral_pool.coin_type])
                .args([
                    clock,
                    oracle,
                    storage,
                    debt_asset,
                    debt_pool_obj,
                    debt_balance,
                    collateral_asset,
                    collateral_pool_obj,
                    borrower,
                    incentive_v2,
                    incentive_v3,
                ]),
        );

        let collateral = tx.adopt_balance(result.nested(0), &CoinType::new(collateral_pool.coin_type));
        let remaining = tx.adopt_balance(result.nested(1), &CoinType::new(debt_pool.coin_type));
        tracing::info!(
            debt = debt_pool.symbol,
            collateral = collateral_pool.symbol,
            "Liquidation emitted"
        );
        Ok((tx.balance_into_coin(collateral), tx.balance_into_coin(remaining)))
    }

    /// Claim every reward described by `claim` as one coin
    pub fn claim_reward(
        &self,
        tx: &mut TransactionBlock,
        claim: &RewardClaim,
    ) -> Result<Coin, LendingError> {
        claim.validate()?;

        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let incentive_v3 = tx.object(&self.objects.incentive_v3);
        let storage = tx.object(&self.objects.storage);
        let fund = tx.object(&claim.reward_fund);
        let assets = tx.pure(PureValue::StringVec(claim.asset_type_names()));
        let rules = tx.pure(PureValue::AddressVec(claim.rule_ids.clone()));
        let result = tx.move_call(
            self.incentive_call("claim_reward", &[claim.reward_coin_type.as_str()])
                .args([clock, incentive_v3, storage, fund, assets, rules]),
        );

        let balance = tx.adopt_balance(result.single(), &claim.reward_coin_type);
        tracing::debug!(reward = %claim.reward_coin_type, assets = claim.asset_coin_types.len(), "Reward claim emitted");
        Ok(tx.balance_into_coin(balance))
    }

    /// Stake SUI for vSui
    pub fn stake_vsui(&self, tx: &mut TransactionBlock, sui: Coin) -> Result<Coin, LendingError> {
        if !sui.coin_type().is_sui() {
            return Err(LendingError::CoinMismatch {
                pool: "SUI".into(),
                found: sui.coin_type().to_string(),
            });
        }
        self.volo_call(tx, "stake_non_entry", sui, &CoinType::new(crate::constants::mainnet::VSUI.coin_type))
    }

    /// Redeem vSui for SUI
    pub fn unstake_vsui(&self, tx: &mut TransactionBlock, vsui: Coin) -> Result<Coin, LendingError> {
        check_coin(&crate::constants::mainnet::VSUI, vsui.coin_type())?;
        self.volo_call(tx, "unstake_instant", vsui, &CoinType::sui())
    }

    fn volo_call(
        &self,
        tx: &mut TransactionBlock,
        function: &str,
        coin: Coin,
        output: &CoinType,
    ) -> Result<Coin, LendingError> {
        let native_pool = tx.object(&ObjectId::new(volo::NATIVE_POOL));
        let metadata = tx.object(&ObjectId::new(volo::METADATA));
        let system = tx.object(&ObjectId::new(SYSTEM_STATE_OBJECT_ID));
        let coin = tx.consume_coin(coin);
        let result = tx.move_call(
            MoveCall::new(&ObjectId::new(volo::PACKAGE), "native_pool", function)
                .args([native_pool, metadata, system, coin]),
        );
        Ok(tx.adopt_coin(result.single(), output))
    }
}
