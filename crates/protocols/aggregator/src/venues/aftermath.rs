//! Aftermath AMM (constant function with expected output)

use navi_core::ObjectId;
use sui_ptb::{MoveCall, TransactionBlock};

use super::{HopOutput, HopRequest, VenueAdapter};
use crate::constants::aftermath;
use crate::state::{AggregatorError, Hop, VenueKind};

/// Aftermath: `swap::swap_exact_in<Lp, CoinIn, CoinOut>`.
///
/// The hop's first type argument is the pool's LP coin; `amount_limit` is the
/// expected output the venue checks against.
#[derive(Debug, Clone)]
pub struct AftermathAdapter {
    package: ObjectId,
    pool_registry: ObjectId,
    protocol_fee_vault: ObjectId,
    treasury: ObjectId,
    insurance_fund: ObjectId,
    referral_vault: ObjectId,
}

impl AftermathAdapter {
    pub fn mainnet() -> Self {
        Self {
            package: ObjectId::new(aftermath::PACKAGE),
            pool_registry: ObjectId::new(aftermath::POOL_REGISTRY),
            protocol_fee_vault: ObjectId::new(aftermath::PROTOCOL_FEE_VAULT),
            treasury: ObjectId::new(aftermath::TREASURY),
            insurance_fund: ObjectId::new(aftermath::INSURANCE_FUND),
            referral_vault: ObjectId::new(aftermath::REFERRAL_VAULT),
        }
    }
}

impl VenueAdapter for AftermathAdapter {
    fn kind(&self) -> VenueKind {
        VenueKind::Aftermath
    }

    /// Pools hold any number of coins, so only the LP type and the expected
    /// output are required; the call is typed by `from` and `target`.
    fn check(&self, hop: &Hop) -> Result<(), AggregatorError> {
        hop.type_argument(0)?;
        hop.amount_limit
            .map(|_| ())
            .ok_or(AggregatorError::MissingHopField {
                venue: VenueKind::Aftermath,
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
        let lp = hop.type_argument(0)?;
        let expected_out = hop.amount_limit.ok_or(AggregatorError::MissingHopField {
            venue: VenueKind::Aftermath,
            field: "amount_limit",
        })?;

        let pool = tx.object(&hop.pool_id);
        let registry = tx.immutable_object(&self.pool_registry);
        let fee_vault = tx.immutable_object(&self.protocol_fee_vault);
        let treasury = tx.object(&self.treasury);
        let insurance = tx.object(&self.insurance_fund);
        let referral = tx.immutable_object(&self.referral_vault);
        let coin_in = tx.consume_coin(request.coin_in);
        let expected = tx.pure_u64(expected_out);
        let slippage = tx.pure_u64(aftermath::ALLOWABLE_SLIPPAGE);

        let result = tx.move_call(
            MoveCall::new(&self.package, "swap", "swap_exact_in")
                .type_args([lp.as_str(), hop.from.as_str(), hop.target.as_str()])
                .args([
                    pool, registry, fee_vault, treasury, insurance, referral, coin_in, expected,
                    slippage,
                ]),
        );
        Ok(HopOutput::new(tx.adopt_coin(result.single(), &hop.target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venues::tests::{hop, move_calls, run_adapter};
    use sui_ptb::{Argument, CallArg, PureValue};

    #[test]
    fn test_aftermath_passes_expected_output() {
        let h = hop(VenueKind::Aftermath, true);
        let ptb = run_adapter(&AftermathAdapter::mainnet(), &h).unwrap();
        let swap = move_calls(&ptb)
            .into_iter()
            .find(|c| c.function == "swap_exact_in")
            .unwrap();
        assert_eq!(swap.type_arguments.len(), 3);
        match swap.arguments[7] {
            Argument::Input(i) => assert_eq!(
                ptb.inputs[i as usize],
                CallArg::Pure(PureValue::U64(3_400_000))
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_aftermath_requires_amount_limit() {
        let mut h = hop(VenueKind::Aftermath, true);
        h.amount_limit = None;
        assert!(matches!(
            run_adapter(&AftermathAdapter::mainnet(), &h),
            Err(AggregatorError::MissingHopField {
                field: "amount_limit",
                ..
            })
        ));
    }

    #[test]
    fn test_aftermath_requires_lp_type() {
        let mut h = hop(VenueKind::Aftermath, false);
        h.type_arguments.clear();
        assert!(matches!(
            AftermathAdapter::mainnet().check(&h),
            Err(AggregatorError::MissingHopField {
                field: "type_arguments",
                ..
            })
        ));
    }
}
