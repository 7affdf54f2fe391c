//! Test support: a stub venue and a small batch evaluator.
//!
//! The evaluator interprets split/merge/transfer commands, the `0x2::coin` and
//! `0x2::balance` helpers, the stub swap and the slippage guard. It tracks coin
//! values so tests can check where value ends up without a ledger.

use std::sync::Mutex;

use navi_core::{Address, CoinType, ObjectId};
use sui_ptb::{
    Argument, CallArg, Command, MoveCall, ProgrammableTransaction, PureValue, TransactionBlock,
};

use crate::constants::aggregator;
use crate::executor::RouteExecutor;
use crate::price::{CoinPrice, PriceSource};
use crate::quote::{QuoteRequest, QuoteSource};
use crate::state::{AggregatorError, Hop, Path, Quote, VenueKind};
use crate::venues::{HopOutput, HopRequest, VenueAdapter};

pub(crate) const USER: &str = "0xa11ce";
pub(crate) const STUB_PACKAGE: &str = "0x5706";

pub(crate) fn coin_a() -> CoinType {
    CoinType::new("0xa::coin_a::COIN_A")
}

pub(crate) fn coin_b() -> CoinType {
    CoinType::new("0xb::coin_b::COIN_B")
}

pub(crate) fn coin_c() -> CoinType {
    CoinType::new("0xc::coin_c::COIN_C")
}

/// Venue that turns any input into a fixed output amount
pub(crate) struct StubAdapter {
    pub kind: VenueKind,
    pub output: u64,
}

impl VenueAdapter for StubAdapter {
    fn kind(&self) -> VenueKind {
        self.kind
    }

    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError> {
        let hop = request.hop;
        let coin_in = tx.consume_coin(request.coin_in);
        let output = tx.pure_u64(self.output);
        let result = tx.move_call(
            MoveCall::new(&ObjectId::new(STUB_PACKAGE), "stub", "swap")
                .type_args([hop.from.as_str(), hop.target.as_str()])
                .args([coin_in, request.amount_in, output]),
        );
        Ok(HopOutput::new(tx.adopt_coin(result.single(), &hop.target)))
    }
}

/// Executor whose only venue is a stub paying `output` per hop
pub(crate) fn stub_executor(output: u64) -> RouteExecutor {
    let mut executor = RouteExecutor::new(ObjectId::new(aggregator::PACKAGE));
    executor.register(Box::new(StubAdapter {
        kind: VenueKind::KriyaV2,
        output,
    }));
    executor
}

pub(crate) fn stub_hop(from: &CoinType, target: &CoinType, amount_in: u64) -> Hop {
    Hop {
        venue: VenueKind::KriyaV2,
        pool_id: ObjectId::new("0x9001"),
        from: from.clone(),
        target: target.clone(),
        a2b: true,
        type_arguments: vec![from.clone(), target.clone()],
        amount_in,
        amount_out: 0,
        amount_limit: None,
        lot_size: None,
    }
}

/// A quote over stub hops from `from` to `target`: 60% direct, 40% via C
pub(crate) fn two_path_quote_between(from: &CoinType, target: &CoinType, amount_in: u64) -> Quote {
    let direct = amount_in * 6 / 10;
    let via = amount_in - direct;
    Quote {
        from: from.clone(),
        target: target.clone(),
        amount_in,
        amount_out: 0,
        paths: vec![
            Path {
                hops: vec![stub_hop(from, target, direct)],
                amount_in: direct,
                amount_out: 0,
            },
            Path {
                hops: vec![stub_hop(from, &coin_c(), via), stub_hop(&coin_c(), target, via)],
                amount_in: via,
                amount_out: 0,
            },
        ],
    }
}

pub(crate) fn two_path_quote(amount_in: u64) -> Quote {
    two_path_quote_between(&coin_a(), &coin_b(), amount_in)
}

/// Single stub hop quote
pub(crate) fn direct_quote(from: &CoinType, target: &CoinType, amount_in: u64) -> Quote {
    Quote {
        from: from.clone(),
        target: target.clone(),
        amount_in,
        amount_out: 0,
        paths: vec![Path {
            hops: vec![stub_hop(from, target, amount_in)],
            amount_in,
            amount_out: 0,
        }],
    }
}

/// Quote source answering every request with one stub hop paying 450
#[derive(Default)]
pub(crate) struct StubQuotes {
    pub requests: Mutex<Vec<QuoteRequest>>,
}

impl QuoteSource for StubQuotes {
    async fn find_routes(&self, request: &QuoteRequest) -> Result<Quote, AggregatorError> {
        self.requests
            .lock()
            .map_err(|_| AggregatorError::InvalidResponse("poisoned".into()))?
            .push(request.clone());
        let mut quote = direct_quote(&request.from, &request.target, request.amount);
        quote.amount_out = 450;
        Ok(quote)
    }
}

pub(crate) struct StubPrices(pub Vec<CoinPrice>);

impl PriceSource for StubPrices {
    async fn prices(&self, coin_types: &[CoinType]) -> Result<Vec<CoinPrice>, AggregatorError> {
        Ok(self
            .0
            .iter()
            .filter(|p| coin_types.contains(&p.coin_type))
            .cloned()
            .collect())
    }
}

pub(crate) fn price(coin_type: CoinType, price: f64, decimals: u8) -> CoinPrice {
    CoinPrice {
        coin_type,
        price,
        decimals,
    }
}

// -----------------------------------------------------------------------------
// Evaluator
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Coin { coin_type: String, amount: u64 },
    Balance { coin_type: String, amount: u64 },
    U64(u64),
    Address(Address),
    Vector(Vec<Value>),
    Opaque,
    Consumed,
}

#[derive(Debug)]
pub(crate) enum EvalError {
    Abort { module: String, code: u64 },
    Invalid(String),
}

/// One transfer observed during evaluation
#[derive(Debug, Clone)]
pub(crate) struct Transfer {
    pub recipient: Address,
    pub coin_type: String,
    pub amount: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub transfers: Vec<Transfer>,
    /// `module::function` of every call the evaluator treated as an event
    pub events: Vec<String>,
    /// Amount each stub swap consumed, in command order
    pub swap_inputs: Vec<u64>,
}

impl Outcome {
    pub fn transfers_of(&self, recipient: &Address, coin_type: &CoinType) -> Vec<u64> {
        self.transfers
            .iter()
            .filter(|t| &t.recipient == recipient && t.coin_type == coin_type.as_str())
            .map(|t| t.amount)
            .collect()
    }

    pub fn received(&self, recipient: &Address, coin_type: &CoinType) -> u64 {
        self.transfers_of(recipient, coin_type).iter().sum()
    }
}

struct Machine {
    gas: Value,
    inputs: Vec<Value>,
    results: Vec<Vec<Value>>,
}

fn invalid(message: impl Into<String>) -> EvalError {
    EvalError::Invalid(message.into())
}

impl Machine {
    fn slot(&mut self, arg: Argument) -> Result<&mut Value, EvalError> {
        let slot = match arg {
            Argument::GasCoin => Some(&mut self.gas),
            Argument::Input(i) => self.inputs.get_mut(i as usize),
            Argument::Result(i) => self.results.get_mut(i as usize).and_then(|r| r.get_mut(0)),
            Argument::NestedResult(i, j) => self
                .results
                .get_mut(i as usize)
                .and_then(|r| r.get_mut(j as usize)),
        };
        slot.ok_or_else(|| invalid(format!("dangling argument {:?}", arg)))
    }

    fn read(&mut self, arg: Argument) -> Result<Value, EvalError> {
        let value = self.slot(arg)?.clone();
        if value == Value::Consumed {
            return Err(invalid(format!("{:?} used after move", arg)));
        }
        Ok(value)
    }

    fn take(&mut self, arg: Argument) -> Result<Value, EvalError> {
        let value = self.read(arg)?;
        *self.slot(arg)? = Value::Consumed;
        Ok(value)
    }

    fn u64(&mut self, arg: Argument) -> Result<u64, EvalError> {
        match self.read(arg)? {
            Value::U64(v) => Ok(v),
            other => Err(invalid(format!("expected u64, found {:?}", other))),
        }
    }

    fn take_coin(&mut self, arg: Argument) -> Result<(String, u64), EvalError> {
        match self.take(arg)? {
            Value::Coin { coin_type, amount } => Ok((coin_type, amount)),
            other => Err(invalid(format!("expected coin, found {:?}", other))),
        }
    }

    fn take_balance(&mut self, arg: Argument) -> Result<(String, u64), EvalError> {
        match self.take(arg)? {
            Value::Balance { coin_type, amount } => Ok((coin_type, amount)),
            other => Err(invalid(format!("expected balance, found {:?}", other))),
        }
    }

    fn call(&mut self, call: &MoveCall, outcome: &mut Outcome) -> Result<Vec<Value>, EvalError> {
        let ty = |i: usize| {
            call.type_arguments
                .get(i)
                .cloned()
                .ok_or_else(|| invalid(format!("{} missing type argument", call.target())))
        };
        let arg = |i: usize| {
            call.arguments
                .get(i)
                .copied()
                .ok_or_else(|| invalid(format!("{} missing argument {}", call.target(), i)))
        };

        match (call.module.as_str(), call.function.as_str()) {
            ("coin", "zero") => Ok(vec![Value::Coin {
                coin_type: ty(0)?,
                amount: 0,
            }]),
            ("balance", "zero") => Ok(vec![Value::Balance {
                coin_type: ty(0)?,
                amount: 0,
            }]),
            ("coin", "value") => match self.read(arg(0)?)? {
                Value::Coin { amount, .. } => Ok(vec![Value::U64(amount)]),
                other => Err(invalid(format!("coin::value on {:?}", other))),
            },
            ("coin", "into_balance") => {
                let (coin_type, amount) = self.take_coin(arg(0)?)?;
                Ok(vec![Value::Balance { coin_type, amount }])
            }
            ("coin", "from_balance") => {
                let (coin_type, amount) = self.take_balance(arg(0)?)?;
                Ok(vec![Value::Coin { coin_type, amount }])
            }
            ("balance", "destroy_zero") | ("coin", "destroy_zero") => {
                let amount = match self.take(arg(0)?)? {
                    Value::Coin { amount, .. } | Value::Balance { amount, .. } => amount,
                    other => return Err(invalid(format!("destroy_zero on {:?}", other))),
                };
                if amount != 0 {
                    return Err(EvalError::Abort {
                        module: call.module.clone(),
                        code: 0,
                    });
                }
                Ok(vec![])
            }
            ("stub", "swap") => {
                let (coin_type, amount) = self.take_coin(arg(0)?)?;
                if coin_type != ty(0)? {
                    return Err(invalid(format!("stub swap fed {}", coin_type)));
                }
                let output = self.u64(arg(2)?)?;
                outcome.swap_inputs.push(amount);
                Ok(vec![Value::Coin {
                    coin_type: ty(1)?,
                    amount: output,
                }])
            }
            ("slippage", "check_slippage_v2") => {
                let held = match self.read(arg(0)?)? {
                    Value::Coin { amount, .. } => amount,
                    other => return Err(invalid(format!("guard on {:?}", other))),
                };
                let min = self.u64(arg(1)?)?;
                if held < min {
                    return Err(EvalError::Abort {
                        module: "slippage".into(),
                        code: 0,
                    });
                }
                Ok(vec![])
            }
            ("fee", _) => {
                outcome
                    .events
                    .push(format!("{}::{}", call.module, call.function));
                Ok(vec![])
            }
            _ => Err(invalid(format!("unsupported call {}", call.target()))),
        }
    }
}

/// Run `ptb` with a gas coin of `gas_type` holding `gas_amount`
pub(crate) fn eval(
    ptb: &ProgrammableTransaction,
    gas_type: &CoinType,
    gas_amount: u64,
) -> Result<Outcome, EvalError> {
    let inputs = ptb
        .inputs
        .iter()
        .map(|input| match input {
            CallArg::Pure(PureValue::U64(v)) => Value::U64(*v),
            CallArg::Pure(PureValue::Address(a)) => Value::Address(a.clone()),
            _ => Value::Opaque,
        })
        .collect();
    let mut machine = Machine {
        gas: Value::Coin {
            coin_type: gas_type.as_str().to_string(),
            amount: gas_amount,
        },
        inputs,
        results: Vec::new(),
    };
    let mut outcome = Outcome::default();

    for command in &ptb.commands {
        let results = match command {
            Command::SplitCoins { coin, amounts } => {
                let amounts = amounts
                    .iter()
                    .map(|a| machine.u64(*a))
                    .collect::<Result<Vec<_>, _>>()?;
                let total: u64 = amounts.iter().sum();
                let Value::Coin { coin_type, amount } = machine.slot(*coin)? else {
                    return Err(invalid("split of a non-coin"));
                };
                if *amount < total {
                    return Err(EvalError::Abort {
                        module: "coin".into(),
                        code: 2,
                    });
                }
                *amount -= total;
                let coin_type = coin_type.clone();
                amounts
                    .into_iter()
                    .map(|amount| Value::Coin {
                        coin_type: coin_type.clone(),
                        amount,
                    })
                    .collect()
            }
            Command::MergeCoins {
                destination,
                sources,
            } => {
                let mut added = 0u64;
                let mut merged_type = None;
                for source in sources {
                    let (coin_type, amount) = machine.take_coin(*source)?;
                    added += amount;
                    merged_type = Some(coin_type);
                }
                let Value::Coin { coin_type, amount } = machine.slot(*destination)? else {
                    return Err(invalid("merge into a non-coin"));
                };
                if merged_type.is_some_and(|t| t != *coin_type) {
                    return Err(invalid("merge of mixed coin types"));
                }
                *amount += added;
                vec![]
            }
            Command::TransferObjects { objects, recipient } => {
                let Value::Address(recipient) = machine.read(*recipient)? else {
                    return Err(invalid("transfer to a non-address"));
                };
                for object in objects {
                    if let Value::Coin { coin_type, amount } = machine.take(*object)? {
                        outcome.transfers.push(Transfer {
                            recipient: recipient.clone(),
                            coin_type,
                            amount,
                        });
                    }
                }
                vec![]
            }
            Command::MakeMoveVec { elements, .. } => {
                let values = elements
                    .iter()
                    .map(|e| machine.take(*e))
                    .collect::<Result<Vec<_>, _>>()?;
                vec![Value::Vector(values)]
            }
            Command::MoveCall(call) => machine.call(call, &mut outcome)?,
        };
        machine.results.push(results);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_tracks_split_and_merge() {
        let mut tx = TransactionBlock::new();
        let parts = tx.split_coins(Argument::GasCoin, &[30, 20], &coin_a());
        let zero = tx.zero_coin(&coin_a());
        tx.merge_coins(zero.argument(), parts);
        tx.transfer_coins(vec![zero], &Address::new(USER));
        let ptb = tx.finish().unwrap();

        let outcome = eval(&ptb, &coin_a(), 100).unwrap();
        assert_eq!(outcome.transfers_of(&Address::new(USER), &coin_a()), vec![50]);
    }

    #[test]
    fn test_eval_rejects_overdraft() {
        let mut tx = TransactionBlock::new();
        let coin = tx.split_coin(Argument::GasCoin, 101, &coin_a());
        tx.transfer_coins(vec![coin], &Address::new(USER));
        let ptb = tx.finish().unwrap();
        assert!(matches!(
            eval(&ptb, &coin_a(), 100),
            Err(EvalError::Abort { code: 2, .. })
        ));
    }
}
