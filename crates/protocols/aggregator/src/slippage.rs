//! Slippage guard
//!
//! The last command of every route: an on-chain assertion that the merged
//! output coin holds at least `min_amount_out`. If it does not, the whole batch
//! aborts.

use navi_core::{CoinType, ObjectId};
use sui_ptb::{Coin, MoveCall, TransactionBlock};
use sui_rpc_client::MoveAbort;

pub const SLIPPAGE_MODULE: &str = "slippage";
pub const CHECK_SLIPPAGE_FUNCTION: &str = "check_slippage_v2";

/// Abort codes raised by the slippage module
const KNOWN_ABORTS: &[(u64, &str)] = &[
    (0, "output below minimum amount out"),
    (1, "zero input amount"),
];

/// Emit `slippage::check_slippage_v2<From, Target>(&coin, min, amount_in, referral)`.
///
/// The coin is borrowed, not consumed.
pub fn check_slippage(
    tx: &mut TransactionBlock,
    aggregator_package: &ObjectId,
    coin_out: &Coin,
    from: &CoinType,
    min_amount_out: u64,
    amount_in: u64,
    referral: u64,
) {
    let coin = coin_out.argument();
    let min = tx.pure_u64(min_amount_out);
    let amount = tx.pure_u64(amount_in);
    let referral = tx.pure_u64(referral);
    tx.move_call(
        MoveCall::new(aggregator_package, SLIPPAGE_MODULE, CHECK_SLIPPAGE_FUNCTION)
            .type_args([from.as_str(), coin_out.coin_type().as_str()])
            .args([coin, min, amount, referral]),
    );
    tracing::debug!(min_amount_out, amount_in, "Slippage guard emitted");
}

/// Human-readable reason for an abort raised by the guard
pub fn describe_abort(abort: &MoveAbort, aggregator_package: &ObjectId) -> Option<&'static str> {
    if !abort.is_from(aggregator_package, SLIPPAGE_MODULE) {
        return None;
    }
    KNOWN_ABORTS
        .iter()
        .find(|(code, _)| *code == abort.code)
        .map(|(_, reason)| *reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::aggregator;
    use navi_core::Address;
    use sui_ptb::{Argument, Command};

    #[test]
    fn test_guard_borrows_coin() {
        let pkg = ObjectId::new(aggregator::PACKAGE);
        let usdc = CoinType::new("0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC");
        let mut tx = TransactionBlock::new();
        let out = tx.split_coin(Argument::GasCoin, 10, &usdc);
        check_slippage(&mut tx, &pkg, &out, &CoinType::sui(), 9, 100, 7);
        assert_eq!(tx.live_handles(), 1);
        tx.transfer_coins(vec![out], &Address::new("0xa"));

        let ptb = tx.finish().unwrap();
        let guard = ptb.find_calls("slippage", "check_slippage_v2").next().unwrap();
        assert_eq!(guard.arguments.len(), 4);
        assert_eq!(guard.arguments[0], Argument::NestedResult(0, 0));
        assert!(guard.type_arguments[0].ends_with("::sui::SUI"));
        assert!(guard.type_arguments[1].ends_with("::usdc::USDC"));
        assert!(matches!(ptb.commands.last(), Some(Command::TransferObjects { .. })));
    }

    #[test]
    fn test_describe_known_abort() {
        let pkg = ObjectId::new(aggregator::PACKAGE);
        let abort = MoveAbort {
            package: pkg.clone(),
            module: "slippage".into(),
            function: Some("check_slippage_v2".into()),
            code: 0,
            command: Some(9),
        };
        assert_eq!(
            describe_abort(&abort, &pkg),
            Some("output below minimum amount out")
        );

        let foreign = MoveAbort {
            package: ObjectId::new("0x2"),
            ..abort
        };
        assert_eq!(describe_abort(&foreign, &pkg), None);
    }
}
