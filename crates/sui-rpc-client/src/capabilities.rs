//! Fullnode probing
//!
//! Detects whether the fullnode is reachable and which network it serves.

use navi_core::Network;
use serde::{Deserialize, Serialize};

use crate::SuiClient;

/// Fullnode facts gathered by probing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCapabilities {
    /// Fullnode is reachable and responding
    pub is_online: bool,

    /// Raw chain identifier (first four bytes of the genesis checkpoint digest)
    pub chain_identifier: Option<String>,

    /// Network the identifier maps to, if known
    pub network: Option<Network>,

    /// Latest executed checkpoint
    pub latest_checkpoint: u64,
}

impl NodeCapabilities {
    fn offline() -> Self {
        Self {
            is_online: false,
            chain_identifier: None,
            network: None,
            latest_checkpoint: 0,
        }
    }

    /// Whether the fullnode serves `expected`
    pub fn serves(&self, expected: Network) -> bool {
        self.network == Some(expected)
    }
}

/// Query the fullnode behind `client` for what it supports
pub async fn detect_capabilities(client: &SuiClient) -> NodeCapabilities {
    let latest_checkpoint = match client.latest_checkpoint().await {
        Ok(seq) => seq,
        Err(e) => {
            tracing::warn!(error = %e, url = %client.config().url, "Fullnode unreachable");
            return NodeCapabilities::offline();
        }
    };

    let chain_identifier = client.chain_identifier().await.ok();
    let network = chain_identifier
        .as_deref()
        .and_then(Network::from_chain_identifier);

    if network.is_none() {
        tracing::warn!(
            chain_identifier = ?chain_identifier,
            "Fullnode serves an unrecognized network"
        );
    }

    NodeCapabilities {
        is_online: true,
        chain_identifier,
        network,
        latest_checkpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_serves_nothing() {
        let caps = NodeCapabilities::offline();
        assert!(!caps.is_online);
        assert!(!caps.serves(Network::Mainnet));
        assert!(!caps.serves(Network::Testnet));
    }

    #[test]
    fn test_serves_detected_network() {
        let caps = NodeCapabilities {
            is_online: true,
            chain_identifier: Some("4c78adac".to_string()),
            network: Network::from_chain_identifier("4c78adac"),
            latest_checkpoint: 42,
        };
        assert!(caps.serves(Network::Testnet));
        assert!(!caps.serves(Network::Mainnet));
    }
}
