//! Borrow-then-repay swap flow shared by the flash-swap venues

use sui_ptb::{Argument, MoveCall, TransactionBlock};

use super::{HopOutput, HopRequest};
use crate::state::AggregatorError;

/// Emit `flash_swap`, settle the receipt, and hand back the received side.
///
/// `flash` must return `(Balance<A>, Balance<B>, Receipt)`. `repay` builds the
/// repay call from `(balance_a, balance_b, receipt)`. The side that was not
/// borrowed comes back empty and is destroyed before repayment; the input coin
/// repays in full together with a fresh zero balance for the other side.
pub(super) fn flash_swap_hop(
    tx: &mut TransactionBlock,
    request: HopRequest<'_>,
    flash: MoveCall,
    repay: impl FnOnce(Argument, Argument, Argument) -> MoveCall,
) -> Result<HopOutput, AggregatorError> {
    let hop = request.hop;
    let (type_a, type_b) = hop.pair()?;
    let (pay_type, receive_type) = if hop.a2b {
        (type_a, type_b)
    } else {
        (type_b, type_a)
    };
    if request.coin_in.coin_type() != pay_type {
        return Err(AggregatorError::InputCoinMismatch {
            expected: pay_type.to_string(),
            found: request.coin_in.coin_type().to_string(),
        });
    }

    let borrowed = tx.move_call(flash);
    let balance_a = tx.adopt_balance(borrowed.nested(0), type_a);
    let balance_b = tx.adopt_balance(borrowed.nested(1), type_b);
    let receipt = borrowed.nested(2);

    let (received, empty) = if hop.a2b {
        (balance_b, balance_a)
    } else {
        (balance_a, balance_b)
    };
    tx.destroy_zero_balance(empty);

    let payment = tx.coin_into_balance(request.coin_in);
    let untouched = tx.zero_balance(receive_type);
    let payment = tx.consume_balance(payment);
    let untouched = tx.consume_balance(untouched);
    let (repay_a, repay_b) = if hop.a2b {
        (payment, untouched)
    } else {
        (untouched, payment)
    };
    tx.move_call(repay(repay_a, repay_b, receipt));

    let coin_out = tx.balance_into_coin(received);
    Ok(HopOutput::new(coin_out))
}
