//! High-level swap entry
//!
//! [`SwapClient::swap_ptb`] fetches the quote(s) a swap needs, then appends
//! the fee leg (if any), the main route and the slippage guard to a
//! caller-owned batch. The output coin is handed back to the caller.

use navi_core::{Address, AggregatorServiceConfig, CoinType, SdkConfig};
use sui_ptb::{Coin, TransactionBlock};

use crate::executor::RouteExecutor;
use crate::fee::{fetch_service_fee, split_fee, FeeLeg, FeeOption, ServiceFee};
use crate::price::{PriceFeedClient, PriceSource};
use crate::quote::{AggregatorClient, QuoteRequest, QuoteSource};
use crate::state::{AggregatorError, Quote};

/// Per-swap options
#[derive(Debug, Clone, Default)]
pub struct SwapOptions {
    /// Direct fee; mutually exclusive with `service_fee`
    pub fee: Option<FeeOption>,
    pub service_fee: Option<ServiceFee>,
    /// Referral code forwarded to the guard and the fee event
    pub referral: u64,
}

impl SwapOptions {
    fn check(&self) -> Result<(), AggregatorError> {
        if self.fee.is_some() && self.service_fee.is_some() {
            return Err(AggregatorError::ConflictingFeeOptions);
        }
        Ok(())
    }
}

/// Quote fetching plus route building
pub struct SwapClient<Q, P> {
    quotes: Q,
    prices: P,
    executor: RouteExecutor,
    config: AggregatorServiceConfig,
    fee_reference: CoinType,
}

impl SwapClient<AggregatorClient, PriceFeedClient> {
    /// Mainnet client from SDK configuration
    pub fn from_config(config: &SdkConfig) -> Result<Self, AggregatorError> {
        let timeout = config.rpc.request_timeout_secs;
        Ok(Self::new(
            AggregatorClient::new(config.aggregator.clone(), timeout)?,
            PriceFeedClient::new(config.price_feed.clone(), timeout)?,
            RouteExecutor::mainnet(),
            config.aggregator.clone(),
        ))
    }
}

impl<Q: QuoteSource, P: PriceSource> SwapClient<Q, P> {
    pub fn new(
        quotes: Q,
        prices: P,
        executor: RouteExecutor,
        config: AggregatorServiceConfig,
    ) -> Self {
        let fee_reference = CoinType::new(&config.fee_reference_coin);
        Self {
            quotes,
            prices,
            executor,
            config,
            fee_reference,
        }
    }

    pub fn executor(&self) -> &RouteExecutor {
        &self.executor
    }

    pub fn fee_reference(&self) -> &CoinType {
        &self.fee_reference
    }

    /// Fetch a quote for swapping `amount` of `from` into `target`
    pub async fn get_quote(
        &self,
        from: &CoinType,
        target: &CoinType,
        amount: u64,
    ) -> Result<Quote, AggregatorError> {
        let request = QuoteRequest::exact_in(&self.config, from, target, amount);
        self.quotes.find_routes(&request).await
    }

    /// Swap `amount_in` of `coin_in` into `target`.
    ///
    /// `coin_in` must hold at least `amount_in`; its remainder goes back to
    /// `user`. Returns the output coin, already checked against
    /// `min_amount_out` by the guard.
    #[allow(clippy::too_many_arguments)]
    pub async fn swap_ptb(
        &self,
        tx: &mut TransactionBlock,
        user: &Address,
        coin_in: Coin,
        target: &CoinType,
        amount_in: u64,
        min_amount_out: u64,
        options: &SwapOptions,
    ) -> Result<Coin, AggregatorError> {
        options.check()?;
        let from = coin_in.coin_type().clone();
        let request = QuoteRequest::exact_in(&self.config, &from, target, amount_in);

        if let Some(service_fee) = &options.service_fee {
            let service = fetch_service_fee(
                &self.quotes,
                &self.prices,
                &request,
                service_fee,
                &self.fee_reference,
            )
            .await?;
            return self.executor.build_with_service_fee(
                tx,
                user,
                min_amount_out,
                coin_in,
                &service,
                options.referral,
            );
        }

        if let Some(fee) = &options.fee {
            let split = split_fee(fee.fee, amount_in)?;
            let main_request = request.with_amount(split.left_amount);

            let (main, fee_quote) = if !split.is_empty() && from != self.fee_reference {
                let fee_request = QuoteRequest {
                    target: self.fee_reference.clone(),
                    ..request.with_amount(split.fee_amount)
                };
                let (main, fee_quote) = tokio::try_join!(
                    self.quotes.find_routes(&main_request),
                    self.quotes.find_routes(&fee_request),
                )?;
                (main, Some(fee_quote))
            } else {
                (self.quotes.find_routes(&main_request).await?, None)
            };

            let leg = FeeLeg {
                receiver: &fee.receiver,
                split,
                quote: fee_quote.as_ref(),
                reference: &self.fee_reference,
            };
            return self.executor.build_with_fee(
                tx,
                user,
                min_amount_out,
                coin_in,
                &main,
                &leg,
                options.referral,
            );
        }

        let quote = self.quotes.find_routes(&request).await?;
        self.executor
            .build_route(tx, user, min_amount_out, coin_in, &quote, options.referral)
    }
}
