//! Turbos CLMM (direct swap with price-limit sentinels)

use navi_core::constants::CLOCK_OBJECT_ID;
use navi_core::ObjectId;
use sui_ptb::{MoveCall, TransactionBlock};

use super::{HopOutput, HopRequest, VenueAdapter};
use crate::constants::{sqrt_price, turbos};
use crate::state::{AggregatorError, Hop, VenueKind};

/// Turbos: `swap_router::swap_{a_b,b_a}_with_return_`, pool typed `<A, B, Fee>`
#[derive(Debug, Clone)]
pub struct TurbosAdapter {
    package: ObjectId,
    versioned: ObjectId,
}

impl TurbosAdapter {
    pub fn new(package: ObjectId, versioned: ObjectId) -> Self {
        Self { package, versioned }
    }

    pub fn mainnet() -> Self {
        Self::new(
            ObjectId::new(turbos::PACKAGE),
            ObjectId::new(turbos::VERSIONED),
        )
    }
}

impl VenueAdapter for TurbosAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::Turbos
    }

    fn check(&self, hop: &Hop) -> Result<(), AggregatorError> {
        hop.check_pool_order(0)?;
        hop.type_argument(2).map(|_| ())
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;
        let (a, b) = hop.pair()?;
        let fee = hop.type_argument(2)?;
        let function = if hop.a2b {
            "swap_a_b_with_return_"
        } else {
            "swap_b_a_with_return_"
        };

        let pool = tx.object(&hop.pool_id);
        let coins = tx.make_coin_vec(vec![request.coin_in]);
        let threshold = tx.pure_u64(0);
        let limit = tx.pure_u128(sqrt_price::limit(hop.a2b));
        let exact_in = tx.pure_bool(true);
        let recipient = tx.pure_address(request.recipient);
        let deadline = tx.pure_u64(request.now_ms.saturating_add(turbos::DEADLINE_MS));
        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let versioned = tx.immutable_object(&self.versioned);

        let result = tx.move_call(
            MoveCall::new(&self.package, "swap_router", function)
                .type_args([a.as_str(), b.as_str(), fee.as_str()])
                .args([
                    pool,
                    coins,
                    request.amount_in,
                    threshold,
                    limit,
                    exact_in,
                    recipient,
                    deadline,
                    clock,
                    versioned,
                ]),
        );

        let coin_out = tx.adopt_coin(result.nested(0), &hop.target);
        let leftover = tx.adopt_coin(result.nested(1), &hop.from);
        Ok(HopOutput::with_leftover(coin_out, leftover))
    }
}
