//! Cetus CLMM (flash swap)

use navi_core::constants::CLOCK_OBJECT_ID;
use navi_core::ObjectId;
use sui_ptb::{MoveCall, TransactionBlock};

use super::flash::flash_swap_hop;
use super::{HopOutput, HopRequest, VenueAdapter};
use crate::constants::{cetus, sqrt_price};
use crate::state::{AggregatorError, VenueKind};

#[derive(Debug, Clone)]
pub struct CetusAdapter {
    package: ObjectId,
    global_config: ObjectId,
}

impl CetusAdapter {
    pub fn new(package: ObjectId, global_config: ObjectId) -> Self {
        Self {
            package,
            global_config,
        }
    }

    pub fn mainnet() -> Self {
        Self::new(
            ObjectId::new(cetus::PACKAGE),
            ObjectId::new(cetus::GLOBAL_CONFIG),
        )
    }
}

impl VenueAdapter for CetusAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::Cetus
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

        let config = tx.immutable_object(&self.global_config);
        let pool = tx.object(&hop.pool_id);
        let a2b = tx.pure_bool(hop.a2b);
        let by_amount_in = tx.pure_bool(true);
        let limit = tx.pure_u128(sqrt_price::limit(hop.a2b));
        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));

        let flash = MoveCall::new(&self.package, "pool", "flash_swap")
            .type_args(&type_args)
            .args([config, pool, a2b, by_amount_in, request.amount_in, limit, clock]);

        let package = self.package.clone();
        flash_swap_hop(tx, request, flash, |balance_a, balance_b, receipt| {
            MoveCall::new(&package, "pool", "repay_flash_swap")
                .type_args(&type_args)
                .args([config, pool, balance_a, balance_b, receipt])
        })
    }
}
