//! Liquid staking venues (vSui, haSui, afSui)
//!
//! `a2b` stakes SUI for the derivative, otherwise the derivative is redeemed
//! instantly. None of these calls take a minimum-output argument: the exchange
//! rate is whatever the staking pool reports, and only the route-level
//! slippage guard bounds the result.

use navi_core::constants::{SYSTEM_STATE_OBJECT_ID, ZERO_ADDRESS};
use navi_core::{Address, CoinType, ObjectId};
use sui_ptb::{Argument, MoveCall, TransactionBlock};

use super::{HopOutput, HopRequest, VenueAdapter};
use crate::constants::{aftermath_lsd, haedal, volo};
use crate::state::{AggregatorError, Hop, VenueKind};

/// Stake direction must start from SUI; redemption must end in SUI.
fn check_direction(hop: &Hop, derivative: &CoinType) -> Result<(), AggregatorError> {
    let (expected_from, expected_target) = if hop.a2b {
        (CoinType::sui(), derivative.clone())
    } else {
        (derivative.clone(), CoinType::sui())
    };
    if hop.from != expected_from || hop.target != expected_target {
        return Err(AggregatorError::HopDirectionMismatch {
            venue: hop.venue,
            a2b: hop.a2b,
            from: hop.from.to_string(),
            target: hop.target.to_string(),
        });
    }
    Ok(())
}

fn finish(tx: &mut TransactionBlock, hop: &Hop, result: Argument) -> HopOutput {
    HopOutput::new(tx.adopt_coin(result, &hop.target))
}

/// Volo vSui
#[derive(Debug, Clone)]
pub struct VSuiAdapter {
    package: ObjectId,
    native_pool: ObjectId,
    metadata: ObjectId,
    cert: CoinType,
}

impl VSuiAdapter {
    pub fn mainnet() -> Self {
        Self {
            package: ObjectId::new(volo::PACKAGE),
            native_pool: ObjectId::new(volo::NATIVE_POOL),
            metadata: ObjectId::new(volo::METADATA),
            cert: CoinType::new(volo::CERT_COIN_TYPE),
        }
    }
}

impl VenueAdapter for VSuiAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::VSui
    }

    fn check(&self, hop: &Hop) -> Result<(), AggregatorError> {
        check_direction(hop, &self.cert)
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;

        let pool = tx.object(&self.native_pool);
        let metadata = tx.object(&self.metadata);
        let system = tx.object(&ObjectId::new(SYSTEM_STATE_OBJECT_ID));
        let coin_in = tx.consume_coin(request.coin_in);
        let function = if hop.a2b {
            "stake_non_entry"
        } else {
            "unstake_instant"
        };
        let result = tx.move_call(
            MoveCall::new(&self.package, "native_pool", function)
                .args([pool, metadata, system, coin_in]),
        );
        Ok(finish(tx, hop, result.single()))
    }
}

/// Haedal haSui
#[derive(Debug, Clone)]
pub struct HaSuiAdapter {
    package: ObjectId,
    staking: ObjectId,
    hasui: CoinType,
}

impl HaSuiAdapter {
    pub fn mainnet() -> Self {
        Self {
            package: ObjectId::new(haedal::PACKAGE),
            staking: ObjectId::new(haedal::STAKING),
            hasui: CoinType::new(haedal::HASUI_COIN_TYPE),
        }
    }
}

impl VenueAdapter for HaSuiAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::HaSui
    }

    fn check(&self, hop: &Hop) -> Result<(), AggregatorError> {
        check_direction(hop, &self.hasui)
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;

        let system = tx.object(&ObjectId::new(SYSTEM_STATE_OBJECT_ID));
        let staking = tx.object(&self.staking);
        let coin_in = tx.consume_coin(request.coin_in);
        let call = if hop.a2b {
            // zero address lets the pool pick a validator
            let validator = tx.pure_address(&Address::new(ZERO_ADDRESS));
            MoveCall::new(&self.package, "staking", "request_stake_coin")
                .args([system, staking, coin_in, validator])
        } else {
            MoveCall::new(&self.package, "staking", "request_unstake_instant_coin")
                .args([system, staking, coin_in])
        };
        let result = tx.move_call(call);
        Ok(finish(tx, hop, result.single()))
    }
}

/// Aftermath afSui
#[derive(Debug, Clone)]
pub struct AfSuiAdapter {
    package: ObjectId,
    vault: ObjectId,
    safe: ObjectId,
    referral_vault: ObjectId,
    treasury: ObjectId,
    validator: Address,
    afsui: CoinType,
}

impl AfSuiAdapter {
    pub fn mainnet() -> Self {
        Self {
            package: ObjectId::new(aftermath_lsd::PACKAGE),
            vault: ObjectId::new(aftermath_lsd::STAKED_SUI_VAULT),
            safe: ObjectId::new(aftermath_lsd::SAFE),
            referral_vault: ObjectId::new(aftermath_lsd::REFERRAL_VAULT),
            treasury: ObjectId::new(aftermath_lsd::TREASURY),
            validator: Address::new(aftermath_lsd::VALIDATOR),
            afsui: CoinType::new(aftermath_lsd::AFSUI_COIN_TYPE),
        }
    }
}

impl VenueAdapter for AfSuiAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::AfSui
    }

    fn check(&self, hop: &Hop) -> Result<(), AggregatorError> {
        check_direction(hop, &self.afsui)
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;

        let vault = tx.object(&self.vault);
        let safe = tx.object(&self.safe);
        let referral = tx.immutable_object(&self.referral_vault);
        let coin_in = tx.consume_coin(request.coin_in);
        let call = if hop.a2b {
            let system = tx.object(&ObjectId::new(SYSTEM_STATE_OBJECT_ID));
            let validator = tx.pure_address(&self.validator);
            MoveCall::new(&self.package, "staked_sui_vault", "request_stake")
                .args([vault, safe, system, referral, coin_in, validator])
        } else {
            let treasury = tx.object(&self.treasury);
            MoveCall::new(&self.package, "staked_sui_vault", "request_unstake_atomic")
                .args([vault, safe, referral, treasury, coin_in])
        };
        let result = tx.move_call(call);
        Ok(finish(tx, hop, result.single()))
    }
}
