//! DeepBook v3 order book

use navi_core::constants::CLOCK_OBJECT_ID;
use navi_core::{CoinType, ObjectId};
use sui_ptb::{MoveCall, TransactionBlock};

use super::{HopOutput, HopRequest, VenueAdapter};
use crate::constants::deepbook;
use crate::state::{AggregatorError, Hop, VenueKind};

/// DeepBook v3: `pool::swap_exact_quantity<Base, Quote>`.
///
/// Both sides are always passed; the side not being sold is an empty coin and
/// so is the DEEP fee coin. `a2b` sells base for quote.
#[derive(Debug, Clone)]
pub struct DeepbookAdapter {
    package: ObjectId,
    deep: CoinType,
}

impl DeepbookAdapter {
    pub fn new(package: ObjectId, deep: CoinType) -> Self {
        Self { package, deep }
    }

    pub fn mainnet() -> Self {
        Self::new(
            ObjectId::new(deepbook::PACKAGE),
            CoinType::new(deepbook::DEEP_COIN_TYPE),
        )
    }
}

impl VenueAdapter for DeepbookAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::Deepbook
    }

    fn check(&self, hop: &Hop) -> Result<(), AggregatorError> {
        hop.check_pool_order(0)?;
        hop.amount_limit
            .map(|_| ())
            .ok_or(AggregatorError::MissingHopField {
                venue: VenueKind::Deepbook,
                field: "amount_limit",
            })
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;
        let (base, quote) = hop.pair()?;
        let min_out = hop.amount_limit.ok_or(AggregatorError::MissingHopField {
            venue: VenueKind::Deepbook,
            field: "amount_limit",
        })?;

        let pool = tx.object(&hop.pool_id);
        let empty_side = tx.zero_coin(&hop.target);
        let deep_in = tx.zero_coin(&self.deep);
        let sold = tx.consume_coin(request.coin_in);
        let empty_side = tx.consume_coin(empty_side);
        let (base_in, quote_in) = if hop.a2b {
            (sold, empty_side)
        } else {
            (empty_side, sold)
        };
        let deep_in = tx.consume_coin(deep_in);
        let min_out = tx.pure_u64(min_out);
        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));

        let result = tx.move_call(
            MoveCall::new(&self.package, "pool", "swap_exact_quantity")
                .type_args([base.as_str(), quote.as_str()])
                .args([pool, base_in, quote_in, deep_in, min_out, clock]),
        );

        let base_out = tx.adopt_coin(result.nested(0), base);
        let quote_out = tx.adopt_coin(result.nested(1), quote);
        let deep_out = tx.adopt_coin(result.nested(2), &self.deep);
        let (coin_out, leftover) = if hop.a2b {
            (quote_out, base_out)
        } else {
            (base_out, quote_out)
        };
        Ok(HopOutput {
            coin_out,
            leftover: Some(leftover),
            fee_coin: Some(deep_out),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venues::tests::{call_sequence, hop, move_calls, run_adapter};
    use sui_ptb::Argument;

    #[test]
    fn test_deepbook_zero_coins_for_idle_sides() {
        let ptb = run_adapter(&DeepbookAdapter::mainnet(), &hop(VenueKind::Deepbook, true)).unwrap();
        assert_eq!(
            call_sequence(&ptb),
            vec!["coin::zero", "coin::zero", "pool::swap_exact_quantity"]
        );
        let calls = move_calls(&ptb);
        let zeros: Vec<&str> = calls
            .iter()
            .filter(|c| c.function == "zero")
            .map(|c| c.type_arguments[0].as_str())
            .collect();
        assert!(zeros[0].ends_with("::usdc::USDC"));
        assert!(zeros[1].ends_with("::deep::DEEP"));

        // selling base: base_in is the split input, quote_in the empty coin
        let swap = calls
            .iter()
            .find(|c| c.function == "swap_exact_quantity")
            .unwrap();
        assert!(matches!(swap.arguments[1], Argument::NestedResult(0, 0)));
    }

    #[test]
    fn test_deepbook_requires_amount_limit() {
        let mut h = hop(VenueKind::Deepbook, false);
        h.amount_limit = None;
        assert!(matches!(
            run_adapter(&DeepbookAdapter::mainnet(), &h),
            Err(AggregatorError::MissingHopField { .. })
        ));
    }
}
