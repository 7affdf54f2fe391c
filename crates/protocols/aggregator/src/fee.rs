//! Fee / Referral Overlay
//!
//! Splits a fee slice off the input coin before the main route runs and
//! delivers it to a receiver in the reference coin.
//!
//! Two modes:
//!
//! - **Direct** ([`FeeOption`]): the caller supplies the fee quote (if any);
//!   the fee coin goes straight to the receiver.
//! - **Service** ([`ServiceFee`]): quotes and prices are fetched together up
//!   front, and a fee event carrying both prices is emitted on-chain.
//!
//! `fee_amount = floor(fee * amount_in)` computed in 10^9 fixed point, and
//! `left_amount = amount_in - fee_amount` is what the main route swaps.

use serde::{Deserialize, Serialize};

use navi_core::{Address, CoinType};
use sui_ptb::{Coin, MoveCall, TransactionBlock};

use crate::constants::aggregator::PRICE_SCALE;
use crate::executor::RouteExecutor;
use crate::price::{price_of, CoinPrice, PriceSource};
use crate::quote::{QuoteRequest, QuoteSource};
use crate::state::{AggregatorError, Quote};

pub const FEE_MODULE: &str = "fee";
pub const FEE_EVENT_FUNCTION: &str = "emit_fee_event";

/// Fee paid straight to `receiver`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeOption {
    /// Fraction of the input, in [0, 1]
    pub fee: f64,
    pub receiver: Address,
}

/// Fee collected on behalf of an integrator, with an audit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFee {
    pub fee: f64,
    pub receiver: Address,
}

/// Input split between the fee slice and the main route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee_amount: u64,
    pub left_amount: u64,
}

impl FeeSplit {
    pub fn is_empty(&self) -> bool {
        self.fee_amount == 0
    }
}

/// Split `amount_in` by `fee`
pub fn split_fee(fee: f64, amount_in: u64) -> Result<FeeSplit, AggregatorError> {
    if !fee.is_finite() || !(0.0..=1.0).contains(&fee) {
        return Err(AggregatorError::InvalidFee(format!(
            "fee {} outside [0, 1]",
            fee
        )));
    }
    let scaled = (fee * PRICE_SCALE as f64).round() as u128;
    let fee_amount = (amount_in as u128 * scaled / PRICE_SCALE as u128) as u64;
    Ok(FeeSplit {
        fee_amount,
        left_amount: amount_in - fee_amount,
    })
}

/// The fee slice of one build
#[derive(Debug, Clone, Copy)]
pub struct FeeLeg<'a> {
    pub receiver: &'a Address,
    pub split: FeeSplit,
    /// Route converting the slice; `None` when the input already is the
    /// reference coin
    pub quote: Option<&'a Quote>,
    pub reference: &'a CoinType,
}

impl FeeLeg<'_> {
    /// Main-route minimum after the fee slice is taken out
    pub fn main_min_amount_out(&self, min_amount_out: u64) -> u64 {
        min_amount_out.saturating_sub(self.quote.map_or(0, |q| q.amount_out))
    }

    /// Check the leg against the main quote before anything is emitted
    fn validate(&self, main: &Quote) -> Result<(), AggregatorError> {
        if main.amount_in != self.split.left_amount {
            return Err(AggregatorError::FeeQuoteMismatch(format!(
                "main quote swaps {}, {} left after fee",
                main.amount_in, self.split.left_amount
            )));
        }
        if self.split.is_empty() {
            return Ok(());
        }
        match self.quote {
            None if &main.from == self.reference => Ok(()),
            None => Err(AggregatorError::FeeQuoteMismatch(format!(
                "{} needs a route to {}",
                main.from, self.reference
            ))),
            Some(quote) => {
                if quote.from != main.from || &quote.target != self.reference {
                    return Err(AggregatorError::FeeQuoteMismatch(format!(
                        "fee quote {} -> {} does not convert {} to {}",
                        quote.from, quote.target, main.from, self.reference
                    )));
                }
                if quote.amount_in != self.split.fee_amount {
                    return Err(AggregatorError::FeeQuoteMismatch(format!(
                        "fee quote swaps {}, fee slice is {}",
                        quote.amount_in, self.split.fee_amount
                    )));
                }
                quote.validate()
            }
        }
    }
}

/// Quotes and prices fetched for a service-fee build
#[derive(Debug, Clone)]
pub struct ServiceFeeQuote {
    /// Route for the amount left after the fee
    pub main: Quote,
    pub fee_quote: Option<Quote>,
    pub split: FeeSplit,
    pub receiver: Address,
    pub reference: CoinType,
    pub from_price: CoinPrice,
    pub reference_price: CoinPrice,
}

impl ServiceFeeQuote {
    pub fn leg(&self) -> FeeLeg<'_> {
        FeeLeg {
            receiver: &self.receiver,
            split: self.split,
            quote: self.fee_quote.as_ref(),
            reference: &self.reference,
        }
    }
}

/// Fetch the main quote, the fee quote and both prices concurrently.
///
/// `request.amount` is the full input; the main quote is requested for the
/// amount left after the fee.
pub async fn fetch_service_fee<Q, P>(
    quotes: &Q,
    prices: &P,
    request: &QuoteRequest,
    fee: &ServiceFee,
    reference: &CoinType,
) -> Result<ServiceFeeQuote, AggregatorError>
where
    Q: QuoteSource,
    P: PriceSource,
{
    let split = split_fee(fee.fee, request.amount)?;
    let main_request = request.with_amount(split.left_amount);
    let needs_fee_route = !split.is_empty() && &request.from != reference;
    let fee_request = QuoteRequest {
        target: reference.clone(),
        ..request.with_amount(split.fee_amount)
    };
    let coin_types = [request.from.clone(), reference.clone()];

    let (main, fee_quote, fetched) = tokio::try_join!(
        quotes.find_routes(&main_request),
        async {
            if needs_fee_route {
                quotes.find_routes(&fee_request).await.map(Some)
            } else {
                Ok(None)
            }
        },
        prices.prices(&coin_types),
    )?;

    let from_price = price_of(&fetched, &request.from)?.clone();
    let reference_price = price_of(&fetched, reference)?.clone();

    tracing::info!(
        fee_amount = split.fee_amount,
        left_amount = split.left_amount,
        fee_route = fee_quote.is_some(),
        "Service fee quoted"
    );

    Ok(ServiceFeeQuote {
        main,
        fee_quote,
        split,
        receiver: fee.receiver.clone(),
        reference: reference.clone(),
        from_price,
        reference_price,
    })
}

/// Emit `fee::emit_fee_event<From, Reference>`
#[allow(clippy::too_many_arguments)]
pub fn emit_fee_event(
    tx: &mut TransactionBlock,
    executor: &RouteExecutor,
    from: &CoinType,
    reference: &CoinType,
    receiver: &Address,
    from_price: &CoinPrice,
    reference_price: &CoinPrice,
    amount_in: u64,
    referral: u64,
) -> Result<(), AggregatorError> {
    let args = [
        tx.pure_address(receiver),
        tx.pure_u8(from_price.decimals),
        tx.pure_u8(reference_price.decimals),
        tx.pure_u64(from_price.scaled()?),
        tx.pure_u64(reference_price.scaled()?),
        tx.pure_u64(amount_in),
        tx.pure_u64(referral),
    ];
    tx.move_call(
        MoveCall::new(executor.aggregator_package(), FEE_MODULE, FEE_EVENT_FUNCTION)
            .type_args([from.as_str(), reference.as_str()])
            .args(args),
    );
    Ok(())
}

impl RouteExecutor {
    /// Split the fee slice off `coin_in` and convert it to the reference coin
    fn route_fee_leg(
        &self,
        tx: &mut TransactionBlock,
        user: &Address,
        coin_in: &Coin,
        leg: &FeeLeg<'_>,
        referral: u64,
    ) -> Result<Coin, AggregatorError> {
        let fee_coin = tx.split_coin(coin_in.argument(), leg.split.fee_amount, coin_in.coin_type());
        match leg.quote {
            Some(quote) => self.build_route(tx, user, 0, fee_coin, quote, referral),
            None => Ok(fee_coin),
        }
    }

    /// Direct fee mode: fee route, fee transfer, then the main route.
    ///
    /// Returns the main route's output coin.
    #[allow(clippy::too_many_arguments)]
    pub fn build_with_fee(
        &self,
        tx: &mut TransactionBlock,
        user: &Address,
        min_amount_out: u64,
        coin_in: Coin,
        main: &Quote,
        leg: &FeeLeg<'_>,
        referral: u64,
    ) -> Result<Coin, AggregatorError> {
        leg.validate(main)?;
        self.preflight(main, &coin_in)?;
        if let Some(quote) = leg.quote {
            self.preflight(quote, &coin_in)?;
        }

        if !leg.split.is_empty() {
            let fee_out = self.route_fee_leg(tx, user, &coin_in, leg, referral)?;
            tx.transfer_coins(vec![fee_out], leg.receiver);
            tracing::debug!(
                fee_amount = leg.split.fee_amount,
                receiver = %leg.receiver,
                "Fee slice routed"
            );
        }

        self.build_route(
            tx,
            user,
            leg.main_min_amount_out(min_amount_out),
            coin_in,
            main,
            referral,
        )
    }

    /// Service fee mode: fee route, main route, fee transfer and fee event.
    pub fn build_with_service_fee(
        &self,
        tx: &mut TransactionBlock,
        user: &Address,
        min_amount_out: u64,
        coin_in: Coin,
        service: &ServiceFeeQuote,
        referral: u64,
    ) -> Result<Coin, AggregatorError> {
        let leg = service.leg();
        leg.validate(&service.main)?;
        self.preflight(&service.main, &coin_in)?;
        if let Some(quote) = leg.quote {
            self.preflight(quote, &coin_in)?;
        }
        // prices are checked before the first command
        service.from_price.scaled()?;
        service.reference_price.scaled()?;

        if leg.split.is_empty() {
            return self.build_route(tx, user, min_amount_out, coin_in, &service.main, referral);
        }

        let fee_out = self.route_fee_leg(tx, user, &coin_in, &leg, referral)?;
        let amount_in = service.main.amount_in + service.split.fee_amount;
        let output = self.build_route(
            tx,
            user,
            leg.main_min_amount_out(min_amount_out),
            coin_in,
            &service.main,
            referral,
        )?;
        tx.transfer_coins(vec![fee_out], &service.receiver);
        emit_fee_event(
            tx,
            self,
            &service.main.from,
            &service.reference,
            &service.receiver,
            &service.from_price,
            &service.reference_price,
            amount_in,
            referral,
        )?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        coin_a, coin_b, coin_c, direct_quote, eval, price, stub_executor, two_path_quote,
        StubPrices, StubQuotes, USER,
    };
    use sui_ptb::{Argument, CallArg, ProgrammableTransaction, PureValue};

    fn user() -> Address {
        Address::new(USER)
    }

    fn receiver() -> Address {
        Address::new("0xfee")
    }

    fn guard_minimums(ptb: &ProgrammableTransaction) -> Vec<u64> {
        ptb.find_calls("slippage", "check_slippage_v2")
            .map(|call| match call.arguments[1] {
                Argument::Input(i) => match &ptb.inputs[i as usize] {
                    CallArg::Pure(PureValue::U64(v)) => *v,
                    other => panic!("unexpected input {:?}", other),
                },
                other => panic!("unexpected argument {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_split_fee() {
        let split = split_fee(0.3, 1_000).unwrap();
        assert_eq!(split.fee_amount, 300);
        assert_eq!(split.left_amount, 700);

        // floor on odd amounts
        let split = split_fee(0.001, 999).unwrap();
        assert_eq!(split.fee_amount, 0);
        assert_eq!(split.left_amount, 999);

        assert_eq!(split_fee(1.0, 5).unwrap().left_amount, 0);
        assert!(matches!(split_fee(1.5, 5), Err(AggregatorError::InvalidFee(_))));
        assert!(matches!(split_fee(-0.1, 5), Err(AggregatorError::InvalidFee(_))));
        assert!(split_fee(f64::NAN, 5).is_err());
    }

    #[test]
    fn test_main_min_floors_at_zero() {
        let fee_quote = direct_quote(&coin_a(), &coin_c(), 300);
        let mut leg = FeeLeg {
            receiver: &receiver(),
            split: split_fee(0.3, 1_000).unwrap(),
            quote: None,
            reference: &coin_c(),
        };
        assert_eq!(leg.main_min_amount_out(500), 500);

        let mut quoted = fee_quote.clone();
        quoted.amount_out = 200;
        leg.quote = Some(&quoted);
        assert_eq!(leg.main_min_amount_out(500), 300);
        assert_eq!(leg.main_min_amount_out(100), 0);
    }

    #[test]
    fn test_fee_conservation() {
        let executor = stub_executor(450);
        let split = split_fee(0.3, 1_000).unwrap();
        let main = two_path_quote(split.left_amount);
        let mut fee_quote = direct_quote(&coin_a(), &coin_c(), split.fee_amount);
        fee_quote.amount_out = 450;
        let reference = coin_c();
        let receiver = receiver();
        let leg = FeeLeg {
            receiver: &receiver,
            split,
            quote: Some(&fee_quote),
            reference: &reference,
        };

        let mut tx = TransactionBlock::new();
        let coin_in = tx.split_coin(Argument::GasCoin, 1_000, &coin_a());
        let out = executor
            .build_with_fee(&mut tx, &user(), 1_200, coin_in, &main, &leg, 0)
            .unwrap();
        tx.transfer_coins(vec![out], &user());
        let ptb = tx.finish().unwrap();

        // fee route first, then the 60/40 main split
        let outcome = eval(&ptb, &coin_a(), 1_000).unwrap();
        assert_eq!(outcome.swap_inputs[..3], [300, 420, 280]);
        assert_eq!(outcome.swap_inputs[..3].iter().sum::<u64>(), 1_000);
        assert_eq!(outcome.received(&receiver, &coin_c()), 450);
        assert_eq!(outcome.received(&user(), &coin_b()), 900);
        assert_eq!(outcome.received(&user(), &coin_a()), 0);
        assert_eq!(guard_minimums(&ptb), vec![0, 750]);
    }

    #[test]
    fn test_fee_in_reference_coin_is_transferred_directly() {
        let executor = stub_executor(450);
        let split = split_fee(0.3, 1_000).unwrap();
        let main = two_path_quote(split.left_amount);
        let reference = coin_a();
        let receiver = receiver();
        let leg = FeeLeg {
            receiver: &receiver,
            split,
            quote: None,
            reference: &reference,
        };

        let mut tx = TransactionBlock::new();
        let coin_in = tx.split_coin(Argument::GasCoin, 1_000, &coin_a());
        let out = executor
            .build_with_fee(&mut tx, &user(), 900, coin_in, &main, &leg, 0)
            .unwrap();
        tx.transfer_coins(vec![out], &user());
        let ptb = tx.finish().unwrap();

        let outcome = eval(&ptb, &coin_a(), 1_000).unwrap();
        assert_eq!(outcome.transfers_of(&receiver, &coin_a()), vec![300]);
        assert_eq!(outcome.received(&user(), &coin_b()), 900);
        assert_eq!(guard_minimums(&ptb), vec![900]);
    }

    #[test]
    fn test_mismatched_fee_quote_emits_nothing() {
        let executor = stub_executor(450);
        let split = split_fee(0.3, 1_000).unwrap();
        let main = two_path_quote(split.left_amount);
        let fee_quote = direct_quote(&coin_a(), &coin_c(), 299);
        let reference = coin_c();
        let receiver = receiver();
        let leg = FeeLeg {
            receiver: &receiver,
            split,
            quote: Some(&fee_quote),
            reference: &reference,
        };

        let mut tx = TransactionBlock::new();
        let coin_in = tx.split_coin(Argument::GasCoin, 1_000, &coin_a());
        let before = tx.commands().len();
        assert!(matches!(
            executor.build_with_fee(&mut tx, &user(), 0, coin_in, &main, &leg, 0),
            Err(AggregatorError::FeeQuoteMismatch(_))
        ));
        assert_eq!(tx.commands().len(), before);
    }

    #[test]
    fn test_bad_main_hop_emits_nothing() {
        let executor = stub_executor(450);
        let split = split_fee(0.3, 1_000).unwrap();
        let mut main = two_path_quote(split.left_amount);
        main.paths[0].hops[0].type_arguments.clear();
        let fee_quote = direct_quote(&coin_a(), &coin_c(), split.fee_amount);
        let reference = coin_c();
        let receiver = receiver();
        let leg = FeeLeg {
            receiver: &receiver,
            split,
            quote: Some(&fee_quote),
            reference: &reference,
        };

        let mut tx = TransactionBlock::new();
        let coin_in = tx.split_coin(Argument::GasCoin, 1_000, &coin_a());
        let (commands, handles) = (tx.commands().len(), tx.live_handles());
        assert!(matches!(
            executor.build_with_fee(&mut tx, &user(), 0, coin_in, &main, &leg, 0),
            Err(AggregatorError::MissingHopField { .. })
        ));
        // the fee slice was not split off either
        assert_eq!(tx.commands().len(), commands);
        assert_eq!(tx.live_handles(), handles);
    }

    #[tokio::test]
    async fn test_service_fee_end_to_end() {
        let quotes = StubQuotes::default();
        let prices = StubPrices(vec![
            price(coin_a(), 3.5, 9),
            price(coin_c(), 1.0, 6),
        ]);
        let request = QuoteRequest::exact_in(&Default::default(), &coin_a(), &coin_b(), 1_000);
        let fee = ServiceFee {
            fee: 0.3,
            receiver: receiver(),
        };

        let service = fetch_service_fee(&quotes, &prices, &request, &fee, &coin_c())
            .await
            .unwrap();
        assert_eq!(service.main.amount_in, 700);
        assert_eq!(service.fee_quote.as_ref().unwrap().amount_in, 300);
        {
            let seen = quotes.requests.lock().unwrap();
            assert_eq!(seen.len(), 2);
            assert!(seen.iter().any(|r| r.amount == 300 && r.target == coin_c()));
        }

        let executor = stub_executor(450);
        let mut tx = TransactionBlock::new();
        let coin_in = tx.split_coin(Argument::GasCoin, 1_000, &coin_a());
        let out = executor
            .build_with_service_fee(&mut tx, &user(), 400, coin_in, &service, 9)
            .unwrap();
        tx.transfer_coins(vec![out], &user());
        let ptb = tx.finish().unwrap();

        let event = ptb.find_calls("fee", "emit_fee_event").next().unwrap();
        assert_eq!(event.arguments.len(), 7);
        let outcome = eval(&ptb, &coin_a(), 1_000).unwrap();
        assert_eq!(outcome.events, vec!["fee::emit_fee_event".to_string()]);
        assert_eq!(outcome.received(&receiver(), &coin_c()), 450);
        assert_eq!(outcome.received(&user(), &coin_b()), 450);
        assert_eq!(guard_minimums(&ptb), vec![0, 0]);
    }

    #[tokio::test]
    async fn test_service_fee_requires_prices() {
        let quotes = StubQuotes::default();
        let prices = StubPrices(vec![price(coin_a(), 3.5, 9)]);
        let request = QuoteRequest::exact_in(&Default::default(), &coin_a(), &coin_b(), 1_000);
        let fee = ServiceFee {
            fee: 0.1,
            receiver: receiver(),
        };
        assert!(matches!(
            fetch_service_fee(&quotes, &prices, &request, &fee, &coin_c()).await,
            Err(AggregatorError::MissingPrice(_))
        ));
    }
}
