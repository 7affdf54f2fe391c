//! Price Feed Client
//!
//! Fetches USD prices and decimals for coin types. Requests are chunked, the
//! chunks fan out concurrently, and each chunk is retried on failure with a
//! fixed delay.

use std::future::Future;
use std::time::Duration;

use futures::future::try_join_all;
use serde::Deserialize;

use navi_core::{CoinType, PriceFeedConfig, RpcError};

use crate::constants::aggregator::PRICE_SCALE;
use crate::state::AggregatorError;

#[derive(Debug, Clone, PartialEq)]
pub struct CoinPrice {
    pub coin_type: CoinType,
    pub price: f64,
    pub decimals: u8,
}

impl CoinPrice {
    /// Price as an integer scaled by 10^9
    pub fn scaled(&self) -> Result<u64, AggregatorError> {
        scale_price(self.price)
    }
}

/// Scale a price to 10^9 fixed point, rounding to nearest
pub fn scale_price(price: f64) -> Result<u64, AggregatorError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AggregatorError::InvalidResponse(format!(
            "price {} cannot be scaled",
            price
        )));
    }
    let scaled = (price * PRICE_SCALE as f64).round();
    if scaled > u64::MAX as f64 {
        return Err(AggregatorError::InvalidResponse(format!(
            "price {} overflows",
            price
        )));
    }
    Ok(scaled as u64)
}

/// Anything that can price coin types
pub trait PriceSource: Send + Sync {
    fn prices(
        &self,
        coin_types: &[CoinType],
    ) -> impl Future<Output = Result<Vec<CoinPrice>, AggregatorError>> + Send;
}

/// Find the price for `coin_type` in a fetched set
pub fn price_of<'a>(
    prices: &'a [CoinPrice],
    coin_type: &CoinType,
) -> Result<&'a CoinPrice, AggregatorError> {
    prices
        .iter()
        .find(|p| &p.coin_type == coin_type)
        .ok_or_else(|| AggregatorError::MissingPrice(coin_type.to_string()))
}

/// Run `attempt` up to `max_attempts` times, sleeping `delay` between tries
pub async fn with_retry<T, F, Fut>(
    label: &str,
    max_attempts: u32,
    delay: Duration,
    mut attempt: F,
) -> Result<T, RpcError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RpcError>>,
{
    let attempts = max_attempts.max(1);
    let mut last = String::new();
    for n in 1..=attempts {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(request = label, attempt = n, attempts, error = %e, "Request failed");
                last = e.to_string();
                if n < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(RpcError::RetriesExhausted {
        attempts,
        message: last,
    })
}

#[derive(Debug, Deserialize)]
struct PriceEnvelope {
    #[serde(default)]
    data: Vec<PriceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceDto {
    coin_type: String,
    #[serde(deserialize_with = "f64_from_str_or_num")]
    price: f64,
    decimals: u8,
}

fn f64_from_str_or_num<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        String(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid price: {}", s))),
    }
}

impl From<PriceDto> for CoinPrice {
    fn from(dto: PriceDto) -> Self {
        Self {
            coin_type: CoinType::new(&dto.coin_type),
            price: dto.price,
            decimals: dto.decimals,
        }
    }
}

/// HTTP price feed
#[derive(Clone)]
pub struct PriceFeedClient {
    http: reqwest::Client,
    config: PriceFeedConfig,
}

impl PriceFeedClient {
    pub fn new(config: PriceFeedConfig, timeout_secs: u64) -> Result<Self, AggregatorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RpcError::Unreachable {
                url: format!("{}: {}", config.base_url, e),
            })?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/navi/coins/prices",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn fetch_chunk(&self, chunk: &[CoinType]) -> Result<Vec<CoinPrice>, RpcError> {
        let url = self.endpoint();
        let coin_types = chunk
            .iter()
            .map(CoinType::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .http
            .get(&url)
            .query(&[("coinTypes", coin_types)])
            .send()
            .await
            .map_err(|e| RpcError::Unreachable {
                url: format!("{}: {}", url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: PriceEnvelope = response
            .json()
            .await
            .map_err(|e| RpcError::ParseError(format!("prices: {}", e)))?;
        Ok(envelope.data.into_iter().map(CoinPrice::from).collect())
    }
}

/// Split `coin_types` into chunks of at most `chunk_size`, fetch them
/// concurrently with retries, and concatenate the answers. Any chunk that
/// exhausts its attempts fails the whole call.
pub(crate) async fn fetch_chunked<'a, F, Fut>(
    coin_types: &'a [CoinType],
    chunk_size: usize,
    max_attempts: u32,
    delay: Duration,
    fetch: F,
) -> Result<Vec<CoinPrice>, AggregatorError>
where
    F: Fn(&'a [CoinType]) -> Fut,
    Fut: Future<Output = Result<Vec<CoinPrice>, RpcError>>,
{
    let fetch = &fetch;
    let chunks = coin_types
        .chunks(chunk_size.max(1))
        .map(|chunk| with_retry("prices", max_attempts, delay, move || fetch(chunk)));
    let prices: Vec<CoinPrice> = try_join_all(chunks).await?.into_iter().flatten().collect();

    tracing::debug!(
        requested = coin_types.len(),
        received = prices.len(),
        "Prices fetched"
    );
    Ok(prices)
}

impl PriceSource for PriceFeedClient {
    async fn prices(&self, coin_types: &[CoinType]) -> Result<Vec<CoinPrice>, AggregatorError> {
        fetch_chunked(
            coin_types,
            self.config.chunk_size,
            self.config.max_attempts,
            Duration::from_millis(self.config.retry_delay_ms),
            |chunk| self.fetch_chunk(chunk),
        )
        .await
    }
}
