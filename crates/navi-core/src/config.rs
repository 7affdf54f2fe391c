//! Configuration types for the SDK

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Network};

/// Fullnode connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC URL (e.g., "https://fullnode.mainnet.sui.io:443")
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://fullnode.mainnet.sui.io:443".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Swap aggregator REST service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorServiceConfig {
    pub base_url: String,

    /// API key sent with quote requests (optional)
    #[serde(default)]
    pub api_key: String,

    /// Maximum hops the router may search
    #[serde(default = "default_depth")]
    pub depth: u8,

    /// Venue allow-list; empty means every venue the SDK supports
    #[serde(default)]
    pub providers: Vec<String>,

    /// Coin type fee slices are converted into
    #[serde(default = "default_fee_reference_coin")]
    pub fee_reference_coin: String,
}

fn default_depth() -> u8 {
    3
}

fn default_fee_reference_coin() -> String {
    "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC".to_string()
}

impl Default for AggregatorServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://open-aggregator-api.naviprotocol.io".to_string(),
            api_key: String::new(),
            depth: default_depth(),
            providers: Vec::new(),
            fee_reference_coin: default_fee_reference_coin(),
        }
    }
}

/// Price feed REST service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    pub base_url: String,

    /// Coin types per request
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Tries per chunk, the first one included
    #[serde(default = "default_max_attempts", alias = "max_retries")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_chunk_size() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://open-api.naviprotocol.io".to_string(),
            chunk_size: default_chunk_size(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Lending protocol package resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Open API base URL serving the latest package id
    pub open_api_url: String,

    /// How long a resolved package id stays fresh
    #[serde(default = "default_package_ttl_secs")]
    pub package_ttl_secs: u64,
}

fn default_package_ttl_secs() -> u64 {
    3600
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            open_api_url: "https://open-api.naviprotocol.io".to_string(),
            package_ttl_secs: default_package_ttl_secs(),
        }
    }
}

/// SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Fullnode connection settings
    pub rpc: RpcConfig,

    /// Network (mainnet or testnet)
    pub network: Network,

    #[serde(default)]
    pub aggregator: AggregatorServiceConfig,

    #[serde(default)]
    pub price_feed: PriceFeedConfig,

    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Referral id attached to slippage checks and fee events
    #[serde(default)]
    pub referral: u64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            network: Network::Mainnet,
            aggregator: AggregatorServiceConfig::default(),
            price_feed: PriceFeedConfig::default(),
            protocol: ProtocolConfig::default(),
            referral: 0,
        }
    }
}

impl SdkConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject values the clients cannot work with
    pub fn validate(&self) -> Result<(), Error> {
        if self.price_feed.chunk_size == 0 {
            return Err(Error::Config("price_feed.chunk_size must be > 0".into()));
        }
        if self.price_feed.max_attempts == 0 {
            return Err(Error::Config("price_feed.max_attempts must be > 0".into()));
        }
        if self.aggregator.depth == 0 {
            return Err(Error::Config("aggregator.depth must be > 0".into()));
        }
        Ok(())
    }
}
