//! Route Executor
//!
//! Turns a [`Quote`] into commands on a caller-owned batch.
//!
//! # Batch Structure
//!
//! ```text
//! acc      = coin::zero<Target>()
//! per path:
//!   coin   = split(coin_in, path.amount_in)
//!   per hop:
//!     amt  = coin::value(&coin)
//!     coin = <venue calls>(coin, amt)      leftovers -> user
//!   merge(acc, coin)
//! transfer(coin_in -> user)
//! slippage::check_slippage_v2(&acc, min_amount_out, amount_in, referral)
//! ```
//!
//! The quote is validated in full before the first command is appended,
//! including every hop against its venue's adapter.

use std::time::{SystemTime, UNIX_EPOCH};

use navi_core::{Address, ObjectId};
use sui_ptb::{Coin, TransactionBlock};

use crate::constants::aggregator;
use crate::slippage::check_slippage;
use crate::state::{AggregatorError, Quote, VenueKind};
use crate::venues::{mainnet_adapters, AdapterRegistry, HopRequest, VenueAdapter};

/// Wall-clock unix ms
pub fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct RouteExecutor {
    adapters: AdapterRegistry,
    aggregator_package: ObjectId,
    clock: fn() -> u64,
}

impl RouteExecutor {
    /// Executor with no adapters
    pub fn new(aggregator_package: ObjectId) -> Self {
        Self {
            adapters: AdapterRegistry::new(),
            aggregator_package,
            clock: unix_time_ms,
        }
    }

    /// Every mainnet venue
    pub fn mainnet() -> Self {
        Self {
            adapters: mainnet_adapters(),
            aggregator_package: ObjectId::new(aggregator::PACKAGE),
            clock: unix_time_ms,
        }
    }

    /// Replace the clock hops read their deadlines from
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Register (or replace) the adapter for its venue
    pub fn register(&mut self, adapter: Box<dyn VenueAdapter>) -> Option<Box<dyn VenueAdapter>> {
        self.adapters.insert(adapter.kind(), adapter)
    }

    pub fn supports(&self, kind: VenueKind) -> bool {
        self.adapters.contains_key(&kind)
    }

    pub fn aggregator_package(&self) -> &ObjectId {
        &self.aggregator_package
    }

    /// Check a quote against this executor without touching a batch
    pub fn preflight(&self, quote: &Quote, coin_in: &Coin) -> Result<(), AggregatorError> {
        quote.validate()?;
        if coin_in.coin_type() != &quote.from {
            return Err(AggregatorError::InputCoinMismatch {
                expected: quote.from.to_string(),
                found: coin_in.coin_type().to_string(),
            });
        }
        for hop in quote.hops() {
            let adapter = self
                .adapters
                .get(&hop.venue)
                .ok_or(AggregatorError::MissingAdapter(hop.venue))?;
            adapter.check(hop)?;
        }
        Ok(())
    }

    /// Append the route for `quote` and return the merged output coin.
    ///
    /// `coin_in` must hold at least `quote.amount_in`; whatever it still holds
    /// afterwards is returned to `user`. The guard borrows the output coin, so
    /// the caller decides where it goes.
    pub fn build_route(
        &self,
        tx: &mut TransactionBlock,
        user: &Address,
        min_amount_out: u64,
        coin_in: Coin,
        quote: &Quote,
        referral: u64,
    ) -> Result<Coin, AggregatorError> {
        self.preflight(quote, &coin_in)?;

        tracing::info!(
            from = %quote.from,
            target = %quote.target,
            amount_in = quote.amount_in,
            expected_out = quote.amount_out,
            min_amount_out,
            paths = quote.paths.len(),
            hops = quote.hop_count(),
            "Building swap route"
        );

        let now_ms = (self.clock)();
        let merged = tx.zero_coin(&quote.target);
        let source = coin_in.argument();

        for (path_index, path) in quote.paths.iter().enumerate() {
            let mut coin = tx.split_coin(source, path.amount_in, &quote.from);

            for hop in &path.hops {
                let adapter = self
                    .adapters
                    .get(&hop.venue)
                    .ok_or(AggregatorError::MissingAdapter(hop.venue))?;
                let amount_in = tx.coin_value(&coin);
                let output = adapter.swap(
                    tx,
                    HopRequest {
                        hop,
                        coin_in: coin,
                        amount_in,
                        recipient: user,
                        now_ms,
                    },
                )?;

                let mut returned = Vec::new();
                returned.extend(output.leftover);
                returned.extend(output.fee_coin);
                tx.transfer_coins(returned, user);

                tracing::debug!(
                    path = path_index,
                    venue = %hop.venue,
                    pool = %hop.pool_id,
                    a2b = hop.a2b,
                    "Hop emitted"
                );
                coin = output.coin_out;
            }

            tx.merge_coins(merged.argument(), vec![coin]);
        }

        tx.transfer_coins(vec![coin_in], user);
        check_slippage(
            tx,
            &self.aggregator_package,
            &merged,
            &quote.from,
            min_amount_out,
            quote.amount_in,
            referral,
        );
        Ok(merged)
    }
}
