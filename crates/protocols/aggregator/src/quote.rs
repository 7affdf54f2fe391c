//! Quote Service Client
//!
//! Fetches routing quotes from the aggregator REST service. Quotes are never
//! cached: every build asks for a fresh one.

use std::future::Future;
use std::time::Duration;

use navi_core::{AggregatorServiceConfig, CoinType, RpcError};

use crate::api::QuoteEnvelope;
use crate::state::{AggregatorError, Quote};

/// Parameters of one `find_routes` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub from: CoinType,
    pub target: CoinType,
    pub amount: u64,
    pub by_amount_in: bool,
    pub depth: u8,
    /// Venue allow-list; empty means no restriction
    pub providers: Vec<String>,
}

impl QuoteRequest {
    /// Exact-input request using the service defaults from `config`
    pub fn exact_in(
        config: &AggregatorServiceConfig,
        from: &CoinType,
        target: &CoinType,
        amount: u64,
    ) -> Self {
        Self {
            from: from.clone(),
            target: target.clone(),
            amount,
            by_amount_in: true,
            depth: config.depth,
            providers: config.providers.clone(),
        }
    }

    /// Same request for a different input amount
    pub fn with_amount(&self, amount: u64) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Query string pairs in wire order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("from", self.from.to_string()),
            ("target", self.target.to_string()),
            ("amount", self.amount.to_string()),
            ("by_amount_in", self.by_amount_in.to_string()),
            ("depth", self.depth.to_string()),
        ];
        if !self.providers.is_empty() {
            pairs.push(("providers", self.providers.join(",")));
        }
        pairs
    }
}

/// Anything that can answer a quote request
pub trait QuoteSource: Send + Sync {
    fn find_routes(
        &self,
        request: &QuoteRequest,
    ) -> impl Future<Output = Result<Quote, AggregatorError>> + Send;
}

/// HTTP client for the aggregator service
#[derive(Clone)]
pub struct AggregatorClient {
    http: reqwest::Client,
    config: AggregatorServiceConfig,
}

impl AggregatorClient {
    pub fn new(config: AggregatorServiceConfig, timeout_secs: u64) -> Result<Self, AggregatorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RpcError::Unreachable {
                url: format!("{}: {}", config.base_url, e),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AggregatorServiceConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/find_routes", self.config.base_url.trim_end_matches('/'))
    }
}

impl QuoteSource for AggregatorClient {
    async fn find_routes(&self, request: &QuoteRequest) -> Result<Quote, AggregatorError> {
        let url = self.endpoint();
        tracing::debug!(
            from = %request.from,
            target = %request.target,
            amount = request.amount,
            "Requesting quote"
        );

        let mut builder = self.http.get(&url).query(&request.query_pairs());
        if !self.config.api_key.is_empty() {
            builder = builder.header("x-navi-token", &self.config.api_key);
        }

        let response = builder.send().await.map_err(|e| RpcError::Unreachable {
            url: format!("{}: {}", url, e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let envelope: QuoteEnvelope = response
            .json()
            .await
            .map_err(|e| RpcError::ParseError(format!("find_routes: {}", e)))?;
        let quote = envelope.into_quote()?;

        tracing::info!(
            amount_in = quote.amount_in,
            amount_out = quote.amount_out,
            paths = quote.paths.len(),
            "Quote received"
        );
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let config = AggregatorServiceConfig {
            providers: vec!["cetus".into(), "turbos".into()],
            ..Default::default()
        };
        let request = QuoteRequest::exact_in(&config, &CoinType::sui(), &CoinType::new("0xb::b::B"), 42);
        let pairs = request.query_pairs();
        assert_eq!(pairs[2], ("amount", "42".to_string()));
        assert_eq!(pairs[3], ("by_amount_in", "true".to_string()));
        assert_eq!(pairs[4], ("depth", "3".to_string()));
        assert_eq!(pairs[5], ("providers", "cetus,turbos".to_string()));

        let smaller = request.with_amount(7);
        assert_eq!(smaller.amount, 7);
        assert_eq!(smaller.target, request.target);
    }

    #[test]
    fn test_providers_omitted_when_empty() {
        let request = QuoteRequest::exact_in(
            &AggregatorServiceConfig::default(),
            &CoinType::sui(),
            &CoinType::sui(),
            1,
        );
        assert!(request.query_pairs().iter().all(|(k, _)| *k != "providers"));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let config = AggregatorServiceConfig {
            base_url: "https://agg.example/".into(),
            ..Default::default()
        };
        let client = AggregatorClient::new(config, 5).unwrap();
        assert_eq!(client.endpoint(), "https://agg.example/find_routes");
    }
}
