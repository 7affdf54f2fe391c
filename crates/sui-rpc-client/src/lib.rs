//! sui-rpc-client: JSON-RPC client for Sui fullnodes
//!
//! Wraps the handful of fullnode methods the SDK needs: owned coin listing,
//! object reads, chain identification and transaction receipts. Network
//! detection is cached after the first query.

pub mod capabilities;
pub mod queries;
pub mod receipt;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use navi_core::{Network, ObjectId, RpcConfig, RpcError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;

pub use capabilities::NodeCapabilities;
pub use receipt::{ExecutionReceipt, ExecutionStatus, MoveAbort, TransactionExecutor};

/// Result type for fullnode client operations
pub type Result<T> = std::result::Result<T, RpcError>;

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Sui fullnode client
#[derive(Clone)]
pub struct SuiClient {
    http: reqwest::Client,
    config: RpcConfig,
    next_id: Arc<AtomicU64>,
    capabilities: Arc<RwLock<Option<NodeCapabilities>>>,
}

impl SuiClient {
    /// Create a client without contacting the fullnode
    pub fn new(config: RpcConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RpcError::Unreachable {
                url: format!("{}: {}", config.url, e),
            })?;

        Ok(Self {
            http,
            config,
            next_id: Arc::new(AtomicU64::new(1)),
            capabilities: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a client and query the fullnode once
    pub async fn connect(config: RpcConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.refresh_capabilities().await;
        Ok(client)
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Query the fullnode again
    pub async fn refresh_capabilities(&self) {
        let caps = capabilities::detect_capabilities(self).await;
        let mut lock = self.capabilities.write().await;
        *lock = Some(caps);
    }

    /// Last detection result (may be stale)
    pub async fn capabilities(&self) -> Option<NodeCapabilities> {
        let lock = self.capabilities.read().await;
        lock.clone()
    }

    /// Network of the connected fullnode, probing if needed
    pub async fn network(&self) -> Result<Network> {
        if let Some(network) = self.capabilities().await.and_then(|c| c.network) {
            return Ok(network);
        }
        let id = self.chain_identifier().await?;
        Network::from_chain_identifier(&id).ok_or_else(|| RpcError::ApiError {
            code: 0,
            message: format!("Unrecognized chain identifier {}", id),
        })
    }

    /// Issue one JSON-RPC call and decode its `result`
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = timed_request(
            self.config.request_timeout_secs,
            self.http.post(&self.config.url).json(&body).send(),
        )
        .await
        .map_err(|e| match e {
            RpcError::ApiError { message, .. } => RpcError::Unreachable {
                url: format!("{}: {}", self.config.url, message),
            },
            other => other,
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| RpcError::ParseError(format!("{}: {}", method, e)))?;
        decode_envelope(method, envelope)
    }

    /// `sui_getChainIdentifier`
    pub async fn chain_identifier(&self) -> Result<String> {
        self.call("sui_getChainIdentifier", serde_json::json!([]))
            .await
    }

    /// Latest checkpoint sequence number
    pub async fn latest_checkpoint(&self) -> Result<u64> {
        let value: String = self
            .call(
                "sui_getLatestCheckpointSequenceNumber",
                serde_json::json!([]),
            )
            .await?;
        value
            .parse()
            .map_err(|e| RpcError::ParseError(format!("checkpoint {}: {}", value, e)))
    }

    /// Reference gas price for the current epoch
    pub async fn reference_gas_price(&self) -> Result<u64> {
        let value: String = self
            .call("suix_getReferenceGasPrice", serde_json::json!([]))
            .await?;
        value
            .parse()
            .map_err(|e| RpcError::ParseError(format!("gas price {}: {}", value, e)))
    }

    pub async fn is_online(&self) -> bool {
        self.latest_checkpoint().await.is_ok()
    }

    /// Read an object with its Move content
    pub async fn get_object(&self, object_id: &ObjectId) -> Result<serde_json::Value> {
        let value: serde_json::Value = self
            .call(
                "sui_getObject",
                serde_json::json!([object_id.as_str(), { "showContent": true, "showType": true }]),
            )
            .await?;

        if value.get("error").is_some_and(|e| !e.is_null()) || value["data"].is_null() {
            return Err(RpcError::ObjectNotFound {
                object_id: object_id.to_string(),
            });
        }
        Ok(value["data"].clone())
    }
}

fn decode_envelope<T>(method: &str, envelope: RpcResponse<T>) -> Result<T> {
    if let Some(error) = envelope.error {
        return Err(RpcError::ApiError {
            code: error.code,
            message: error.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| RpcError::ParseError(format!("{}: response has no result", method)))
}

/// Apply the configured timeout to a fullnode request.
async fn timed_request<T, E: std::fmt::Display>(
    timeout_secs: u64,
    fut: impl std::future::Future<Output = std::result::Result<T, E>>,
) -> Result<T> {
    tokio::time::timeout(Duration::from_secs(timeout_secs), fut)
        .await
        .map_err(|_| RpcError::ApiError {
            code: 0,
            message: format!("Fullnode request timed out after {}s", timeout_secs),
        })?
        .map_err(|e| RpcError::ApiError {
            code: 0,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_config() {
        let client = SuiClient::new(RpcConfig::default()).unwrap();
        assert_eq!(client.config().url, "https://fullnode.mainnet.sui.io:443");
    }

    #[test]
    fn test_decode_envelope_result() {
        let envelope: RpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"35834a8a"}"#).unwrap();
        assert_eq!(
            decode_envelope("sui_getChainIdentifier", envelope).unwrap(),
            "35834a8a"
        );
    }

    #[test]
    fn test_decode_envelope_error() {
        let envelope: RpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Invalid params"}}"#,
        )
        .unwrap();
        match decode_envelope("suix_getCoins", envelope) {
            Err(RpcError::ApiError { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid params");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_envelope_missing_result() {
        let envelope: RpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(matches!(
            decode_envelope("x", envelope),
            Err(RpcError::ParseError(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_request_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, String>(())
        };
        match timed_request(5, slow).await {
            Err(RpcError::ApiError { message, .. }) => assert!(message.contains("timed out")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
