//! Kriya spot DEX (v2, constant product) and Kriya CLMM (v3, flash swap)

use navi_core::constants::CLOCK_OBJECT_ID;
use navi_core::ObjectId;
use sui_ptb::{MoveCall, TransactionBlock};

use super::flash::flash_swap_hop;
use super::{HopOutput, HopRequest, VenueAdapter};
use crate::constants::{kriya_v2, kriya_v3, sqrt_price};
use crate::state::{AggregatorError, VenueKind};

/// Kriya v2: `spot_dex::swap_token_x` / `swap_token_y`
#[derive(Debug, Clone)]
pub struct KriyaV2Adapter {
    package: ObjectId,
}

impl KriyaV2Adapter {
    pub fn new(package: ObjectId) -> Self {
        Self { package }
    }

    pub fn mainnet() -> Self {
        Self::new(ObjectId::new(kriya_v2::PACKAGE))
    }
}

impl VenueAdapter for KriyaV2Adapter {
    fn kind(&self) -> VenueKind {
        VenueKind::KriyaV2
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;
        let (x, y) = hop.pair()?;
        let function = if hop.a2b {
            "swap_token_x"
        } else {
            "swap_token_y"
        };

        let pool = tx.object(&hop.pool_id);
        let coin_in = tx.consume_coin(request.coin_in);
        // The route-level guard bounds the output; hops accept anything.
        let min_out = tx.pure_u64(0);

        let result = tx.move_call(
            MoveCall::new(&self.package, "spot_dex", function)
                .type_args([x.as_str(), y.as_str()])
                .args([pool, coin_in, request.amount_in, min_out]),
        );
        Ok(HopOutput::new(tx.adopt_coin(result.single(), &hop.target)))
    }
}

/// Kriya v3: `trade::flash_swap` + `trade::repay_flash_swap`
#[derive(Debug, Clone)]
pub struct KriyaV3Adapter {
    package: ObjectId,
    version: ObjectId,
}

impl KriyaV3Adapter {
    pub fn new(package: ObjectId, version: ObjectId) -> Self {
        Self { package, version }
    }

    pub fn mainnet() -> Self {
        Self::new(
            ObjectId::new(kriya_v3::PACKAGE),
            ObjectId::new(kriya_v3::VERSION),
        )
    }
}

impl VenueAdapter for KriyaV3Adapter {
    fn kind(&self) -> VenueKind {
        VenueKind::KriyaV3
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;
        let (a, b) = hop.pair()?;
        let type_args = [a.as_str().to_string(), b.as_str().to_string()];

        let pool = tx.object(&hop.pool_id);
        let a2b = tx.pure_bool(hop.a2b);
        let by_amount_in = tx.pure_bool(true);
        let limit = tx.pure_u128(sqrt_price::limit(hop.a2b));
        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let version = tx.immutable_object(&self.version);

        let flash = MoveCall::new(&self.package, "trade", "flash_swap")
            .type_args(&type_args)
            .args([pool, a2b, by_amount_in, request.amount_in, limit, clock, version]);

        let package = self.package.clone();
        flash_swap_hop(tx, request, flash, |balance_a, balance_b, receipt| {
            MoveCall::new(&package, "trade", "repay_flash_swap")
                .type_args(&type_args)
                .args([pool, receipt, balance_a, balance_b, version])
        })
    }
}
