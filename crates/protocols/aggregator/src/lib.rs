//! Swap Aggregator
//!
//! Builds multi-hop, multi-venue swap routes into a programmable transaction
//! batch: one adapter per venue, a route executor that splits the input
//! across paths and merges the outputs, an optional fee leg, and a terminal
//! on-chain slippage guard.

pub mod api;
pub mod constants;
pub mod executor;
pub mod fee;
pub mod price;
pub mod quote;
pub mod slippage;
pub mod state;
pub mod swap;
pub mod venues;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use executor::RouteExecutor;
pub use fee::{
    emit_fee_event, fetch_service_fee, split_fee, FeeLeg, FeeOption, FeeSplit, ServiceFee,
    ServiceFeeQuote,
};
pub use price::{scale_price, CoinPrice, PriceFeedClient, PriceSource};
pub use quote::{AggregatorClient, QuoteRequest, QuoteSource};
pub use slippage::{check_slippage, describe_abort};
pub use state::{AggregatorError, Hop, Path, Quote, VenueKind};
pub use swap::{SwapClient, SwapOptions};
pub use venues::{mainnet_adapters, AdapterRegistry, HopOutput, HopRequest, VenueAdapter};
