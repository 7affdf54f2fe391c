//! Bluefin spot CLMM (two-sided balances)

use navi_core::constants::CLOCK_OBJECT_ID;
use navi_core::ObjectId;
use sui_ptb::{MoveCall, TransactionBlock};

use super::{HopOutput, HopRequest, VenueAdapter};
use crate::constants::{bluefin, sqrt_price};
use crate::state::{AggregatorError, VenueKind};

/// Bluefin: `pool::swap` takes and returns a `(Balance<A>, Balance<B>)` pair
#[derive(Debug, Clone)]
pub struct BluefinAdapter {
    package: ObjectId,
    global_config: ObjectId,
}

impl BluefinAdapter {
    pub fn new(package: ObjectId, global_config: ObjectId) -> Self {
        Self {
            package,
            global_config,
        }
    }

    pub fn mainnet() -> Self {
        Self::new(
            ObjectId::new(bluefin::PACKAGE),
            ObjectId::new(bluefin::GLOBAL_CONFIG),
        )
    }
}

impl VenueAdapter for BluefinAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::Bluefin
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        self.check(hop)?;
        let (a, b) = hop.pair()?;

        let input = tx.coin_into_balance(request.coin_in);
        let opposite = tx.zero_balance(&hop.target);
        let input = tx.consume_balance(input);
        let opposite = tx.consume_balance(opposite);
        let (balance_a, balance_b) = if hop.a2b {
            (input, opposite)
        } else {
            (opposite, input)
        };

        let clock = tx.immutable_object(&ObjectId::new(CLOCK_OBJECT_ID));
        let config = tx.object(&self.global_config);
        let pool = tx.object(&hop.pool_id);
        let a2b = tx.pure_bool(hop.a2b);
        let by_amount_in = tx.pure_bool(true);
        let limit_out = tx.pure_u64(0);
        let price_limit = tx.pure_u128(sqrt_price::limit(hop.a2b));

        let result = tx.move_call(
            MoveCall::new(&self.package, "pool", "swap")
                .type_args([a.as_str(), b.as_str()])
                .args([
                    clock,
                    config,
                    pool,
                    balance_a,
                    balance_b,
                    a2b,
                    by_amount_in,
                    request.amount_in,
                    limit_out,
                    price_limit,
                ]),
        );

        let out_a = tx.adopt_balance(result.nested(0), a);
        let out_b = tx.adopt_balance(result.nested(1), b);
        let (received, remainder) = if hop.a2b {
            (out_b, out_a)
        } else {
            (out_a, out_b)
        };
        let coin_out = tx.balance_into_coin(received);
        let leftover = tx.balance_into_coin(remainder);
        Ok(HopOutput::with_leftover(coin_out, leftover))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venues::tests::{call_sequence, hop, move_calls, run_adapter};

    #[test]
    fn test_bluefin_two_sided_balances() {
        let ptb = run_adapter(&BluefinAdapter::mainnet(), &hop(VenueKind::Bluefin, true)).unwrap();
        assert_eq!(
            call_sequence(&ptb),
            vec![
                "coin::into_balance",
                "balance::zero",
                "pool::swap",
                "coin::from_balance",
                "coin::from_balance",
            ]
        );
        let calls = move_calls(&ptb);
        let conversions: Vec<&str> = calls
            .iter()
            .filter(|c| c.function == "from_balance")
            .map(|c| c.type_arguments[0].as_str())
            .collect();
        // received side first, leftover input second
        assert!(conversions[0].ends_with("::usdc::USDC"));
        assert!(conversions[1].ends_with("::sui::SUI"));
    }
}
